use crate::walk::{walk_source, WalkItem};
use rayon::prelude::*;
use std::fs;
use std::ops::Add;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read-only summary of what a merge would touch. Can go stale if the
/// sources change before the merge runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewStats {
    pub file_count: u64,
    pub dir_count: u64,
    pub total_bytes: u64,
}

impl PreviewStats {
    /// Number of progress events a full run without cancellation emits.
    pub fn total_items(&self) -> u64 {
        self.file_count + self.dir_count
    }
}

impl Add for PreviewStats {
    type Output = PreviewStats;

    fn add(self, other: PreviewStats) -> PreviewStats {
        PreviewStats {
            file_count: self.file_count + other.file_count,
            dir_count: self.dir_count + other.dir_count,
            total_bytes: self.total_bytes + other.total_bytes,
        }
    }
}

/// Count directories (each root included), files and bytes across all sources.
///
/// Roots are walked in parallel. A file whose size cannot be read still counts
/// as a file but adds no bytes.
pub fn estimate(source_roots: &[PathBuf]) -> PreviewStats {
    let stats = source_roots
        .par_iter()
        .map(|root| estimate_root(root))
        .reduce(PreviewStats::default, |a, b| a + b);

    debug!(
        "Estimate: {} files, {} folders, {} bytes",
        stats.file_count, stats.dir_count, stats.total_bytes
    );
    stats
}

fn estimate_root(root: &Path) -> PreviewStats {
    let mut stats = PreviewStats::default();

    for item in walk_source(root) {
        match item {
            WalkItem::Dir(_) => stats.dir_count += 1,
            WalkItem::File(path) => {
                stats.file_count += 1;
                match fs::metadata(&path) {
                    Ok(meta) => stats.total_bytes += meta.len(),
                    Err(err) => warn!("Could not read size of {}: {}", path.display(), err),
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_counts_roots_and_bytes() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(a.join("sub")).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("x.txt"), "12345").unwrap();
        fs::write(a.join("sub/y.txt"), "123").unwrap();
        fs::write(b.join("z.bin"), vec![0u8; 10]).unwrap();

        let stats = estimate(&[a, b]);
        assert_eq!(
            stats,
            PreviewStats {
                file_count: 3,
                dir_count: 3,
                total_bytes: 18,
            }
        );
        assert_eq!(stats.total_items(), 6);
    }

    #[test]
    fn test_empty_root_counts_itself() {
        let tmp = tempdir().unwrap();
        let stats = estimate(&[tmp.path().to_path_buf()]);
        assert_eq!(stats.dir_count, 1);
        assert_eq!(stats.file_count, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tmp = tempdir().unwrap();
        let stats = estimate(&[tmp.path().join("gone")]);
        assert_eq!(stats, PreviewStats::default());
    }

    #[test]
    fn test_estimate_creates_nothing() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("f"), "abc").unwrap();
        estimate(&[tmp.path().to_path_buf()]);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
