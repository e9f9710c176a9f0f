use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

const MERGED_SUFFIX: &str = "_merged";

/// Validated input for one merge: the ordered source roots and one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    sources: Vec<PathBuf>,
    destination: PathBuf,
}

impl MergeRequest {
    /// Build a request, rejecting empty or missing sources and destinations that
    /// would be walked as part of a source.
    pub fn new<P: AsRef<Path>>(sources: &[P], destination: impl AsRef<Path>) -> Result<Self> {
        let sources: Vec<PathBuf> = sources.iter().map(|s| s.as_ref().to_path_buf()).collect();
        let destination = destination.as_ref().to_path_buf();

        if sources.is_empty() {
            return Err(Error::InvalidRequest(
                "select at least one folder to merge".to_string(),
            ));
        }
        if destination.as_os_str().is_empty() {
            return Err(Error::InvalidRequest(
                "destination folder is empty".to_string(),
            ));
        }

        for source in &sources {
            match fs::metadata(source) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    return Err(Error::InvalidRequest(format!(
                        "source {} is not a folder",
                        source.display()
                    )))
                }
                Err(err) => {
                    return Err(Error::InvalidRequest(format!(
                        "source {} is not readable: {}",
                        source.display(),
                        err
                    )))
                }
            }
        }

        if let Ok(meta) = fs::metadata(&destination) {
            if !meta.is_dir() {
                return Err(Error::InvalidRequest(format!(
                    "destination {} exists and is not a folder",
                    destination.display()
                )));
            }
        }

        if let Some(source) = overlapping_source(&sources, &destination)? {
            return Err(Error::InvalidRequest(format!(
                "destination {} is inside source {}",
                destination.display(),
                source.display()
            )));
        }

        Ok(Self {
            sources,
            destination,
        })
    }

    /// Destination becomes `<parent>/<first source name>_merged`.
    pub fn with_merged_destination<P: AsRef<Path>>(
        sources: &[P],
        parent: impl AsRef<Path>,
    ) -> Result<Self> {
        let first = sources.first().ok_or_else(|| {
            Error::InvalidRequest("select at least one folder to merge".to_string())
        })?;
        let name = merged_folder_name(first.as_ref())?;
        Self::new(sources, parent.as_ref().join(name))
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

fn merged_folder_name(source: &Path) -> Result<OsString> {
    let canonical = fs::canonicalize(source).map_err(|err| {
        Error::InvalidRequest(format!(
            "source {} is not readable: {}",
            source.display(),
            err
        ))
    })?;
    let mut name = canonical
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("root"));
    name.push(MERGED_SUFFIX);
    Ok(name)
}

/// First source that equals or contains the destination, if any.
fn overlapping_source<'a>(sources: &'a [PathBuf], destination: &Path) -> Result<Option<&'a PathBuf>> {
    let dest = canonicalize_lenient(destination)?;
    for source in sources {
        let source_canonical = fs::canonicalize(source)?;
        if dest.starts_with(&source_canonical) {
            return Ok(Some(source));
        }
    }
    Ok(None)
}

/// Resolve `path` one component at a time. Existing prefixes are canonicalized
/// (symlinks followed); `.` and `..` in the missing part are folded lexically,
/// so `missing/../..` cannot hide where the path really ends up.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => {
                resolved.push(other.as_os_str());
                if let Ok(canonical) = fs::canonicalize(&resolved) {
                    resolved = canonical;
                }
            }
        }
    }
    Ok(resolved)
}
