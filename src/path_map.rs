use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Re-root `current` (a directory somewhere under `source_root`) beneath `dest_root`.
///
/// `map_destination(root, root, dest)` is `dest` itself. Paths that do not live
/// under `source_root` fail with [`Error::InvalidPath`].
pub fn map_destination(source_root: &Path, current: &Path, dest_root: &Path) -> Result<PathBuf> {
    let relative = relative_to(source_root, current)?;
    if relative.as_os_str().is_empty() {
        return Ok(dest_root.to_path_buf());
    }
    Ok(dest_root.join(relative))
}

/// Path of `path` relative to `root`, with `.` segments and separators normalized.
/// Returns an empty path when both point at the same place.
pub fn relative_to(root: &Path, path: &Path) -> Result<PathBuf> {
    let root_norm = normalize(root);
    let path_norm = normalize(path);

    path_norm
        .strip_prefix(&root_norm)
        .map(|rel| rel.to_path_buf())
        .map_err(|_| Error::InvalidPath {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
}

/// Lexical normalization: drops `.` components, folds `..` where possible and
/// rebuilds the path so separators are platform-native.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component.as_os_str());
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}
