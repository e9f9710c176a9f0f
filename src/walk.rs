use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// An entry the merge cares about. Directories arrive before their contents,
/// and a directory's own files arrive before any of its sub-directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    Dir(PathBuf),
    File(PathBuf),
}

/// Top-down traversal of `root` in merge order.
///
/// Symlinks are not followed. A symlink to a file is reported as a file; links
/// to directories, dangling links and special files are skipped. A directory
/// that cannot be listed is skipped together with everything below it, and so
/// is any other unreadable entry; each gets a warning.
pub fn walk_source(root: &Path) -> impl Iterator<Item = WalkItem> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_first)
        .into_iter()
        .filter_map(|entry_result| match entry_result {
            Ok(entry) => classify(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn classify(entry: DirEntry) -> Option<WalkItem> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        // walkdir yields the directory before trying to list it
        if let Err(err) = fs::read_dir(entry.path()) {
            warn!("Skipping unreadable folder {}: {}", entry.path().display(), err);
            return None;
        }
        return Some(WalkItem::Dir(entry.into_path()));
    }
    if file_type.is_file() {
        return Some(WalkItem::File(entry.into_path()));
    }
    if file_type.is_symlink() {
        return match fs::metadata(entry.path()) {
            Ok(target) if target.is_file() => Some(WalkItem::File(entry.into_path())),
            _ => {
                debug!("Skipping symlink {}", entry.path().display());
                None
            }
        };
    }
    debug!("Skipping special file {}", entry.path().display());
    None
}
