use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Find a free sibling name for `desired`, which is known to already exist.
///
/// Tries `<base>_1<ext>`, `<base>_2<ext>`, ... and returns the first candidate
/// with nothing on disk. Not atomic against other writers; the engine is the
/// only writer to the destination during a run.
pub fn resolve(desired: &Path) -> PathBuf {
    let parent = desired.parent().unwrap_or_else(|| Path::new(""));
    let file_name = desired.file_name().unwrap_or_else(|| desired.as_os_str());
    let (base, extension) = split_name(file_name);

    (1u64..)
        .map(|n| parent.join(candidate_name(&base, &extension, n)))
        .find(|candidate| !exists(candidate))
        .unwrap_or_else(|| desired.to_path_buf())
}

/// Split a file name into `(base, extension)` where the extension keeps its
/// leading dot. Dotfiles such as `.bashrc` have an empty extension, and only
/// the last dot separates (`a.tar.gz` -> `a.tar`, `.gz`).
pub fn split_name(file_name: &OsStr) -> (OsString, OsString) {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            (stem.to_os_string(), dotted)
        }
        _ => (file_name.to_os_string(), OsString::new()),
    }
}

fn candidate_name(base: &OsStr, extension: &OsStr, n: u64) -> OsString {
    let mut name = base.to_os_string();
    name.push(format!("_{}", n));
    name.push(extension);
    name
}

// Dangling symlinks count as taken.
fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}
