use crate::cancel::CancellationSignal;
use crate::collision;
use crate::error::Error;
use crate::merge_log::{LogEntry, MergeLog};
use crate::path_map;
use crate::progress::{MergeReporter, ProgressEvent, ProgressKind};
use crate::request::MergeRequest;
use crate::walk::{walk_source, WalkItem};
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Canceled,
}

/// Fatal merge error together with everything logged before it.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct MergeFailure {
    pub error: Error,
    pub log: MergeLog,
}

pub struct MergeEngine {
    request: MergeRequest,
    cancel: CancellationSignal,
}

impl MergeEngine {
    pub fn new(request: MergeRequest, cancel: CancellationSignal) -> Self {
        Self { request, cancel }
    }

    /// Run the merge into a fresh log. Whether the run was canceled can be read
    /// back from the cancellation signal.
    pub fn run(&self, reporter: &dyn MergeReporter) -> Result<MergeLog, MergeFailure> {
        let mut log = MergeLog::new();
        match self.run_into(&mut log, reporter) {
            Ok(_) => Ok(log),
            Err(error) => Err(MergeFailure { error, log }),
        }
    }

    /// Merge every source root, in order, appending to `log`.
    ///
    /// Cancellation is checked before each directory and before each file.
    /// The first copy or folder-creation error stops the run; `log` keeps the
    /// entries written up to that point.
    pub fn run_into(
        &self,
        log: &mut MergeLog,
        reporter: &dyn MergeReporter,
    ) -> Result<RunStatus, Error> {
        let destination = self.request.destination();
        let mut processed: u64 = 0;

        for source_root in self.request.sources() {
            info!(
                "Merging {} into {}",
                source_root.display(),
                destination.display()
            );
            let root_start = Instant::now();

            let status =
                self.merge_root(source_root, destination, log, reporter, &mut processed)?;
            if status == RunStatus::Canceled {
                info!("Merge canceled after {} items", processed);
                return Ok(RunStatus::Canceled);
            }

            debug!(
                "Finished {} in {:.2}s",
                source_root.display(),
                root_start.elapsed().as_secs_f64()
            );
        }

        Ok(RunStatus::Completed)
    }

    fn merge_root(
        &self,
        source_root: &Path,
        destination: &Path,
        log: &mut MergeLog,
        reporter: &dyn MergeReporter,
        processed: &mut u64,
    ) -> Result<RunStatus, Error> {
        // Mapped destination of the directory whose files are being copied
        let mut dest_dir = destination.to_path_buf();

        for item in walk_source(source_root) {
            if self.cancel.is_canceled() {
                return Ok(RunStatus::Canceled);
            }

            match item {
                WalkItem::Dir(dir) => {
                    dest_dir = path_map::map_destination(source_root, &dir, destination)?;
                    if !dest_dir.is_dir() {
                        fs::create_dir_all(&dest_dir).map_err(|source| {
                            error!("Failed to create folder {}: {}", dest_dir.display(), source);
                            Error::CreateDir {
                                path: dest_dir.clone(),
                                source,
                            }
                        })?;
                        debug!("Created folder {}", dest_dir.display());
                        log.push(LogEntry::CreatedFolder(dest_dir.clone()));
                    }

                    *processed += 1;
                    reporter.report(&progress_event(
                        ProgressKind::Folder,
                        source_root,
                        dir,
                        *processed,
                    )?);
                }
                WalkItem::File(file) => {
                    let entry = copy_into(&file, &dest_dir)?;
                    log.push(entry);

                    *processed += 1;
                    reporter.report(&progress_event(
                        ProgressKind::File,
                        source_root,
                        file,
                        *processed,
                    )?);
                }
            }
        }

        Ok(RunStatus::Completed)
    }
}

fn progress_event(
    kind: ProgressKind,
    source_root: &Path,
    source_path: PathBuf,
    items_processed: u64,
) -> Result<ProgressEvent, Error> {
    let mut relative_path = path_map::relative_to(source_root, &source_path)?;
    if relative_path.as_os_str().is_empty() {
        relative_path = PathBuf::from(".");
    }
    Ok(ProgressEvent {
        kind,
        source_path,
        relative_path,
        items_processed,
    })
}

/// Copy `file` into `dest_dir` under its own name, or under a suffixed name
/// when that one is taken.
fn copy_into(file: &Path, dest_dir: &Path) -> Result<LogEntry, Error> {
    let file_name = file.file_name().ok_or_else(|| Error::InvalidPath {
        path: file.to_path_buf(),
        root: dest_dir.to_path_buf(),
    })?;
    let desired = dest_dir.join(file_name);

    if desired.symlink_metadata().is_err() {
        copy_with_metadata(file, &desired)?;
        debug!("Copied {} -> {}", file.display(), desired.display());
        return Ok(LogEntry::CopiedFile {
            from: file.to_path_buf(),
            to: desired,
        });
    }

    let renamed = collision::resolve(&desired);
    copy_with_metadata(file, &renamed)?;
    debug!(
        "Copied {} -> {} (renamed)",
        file.display(),
        renamed.display()
    );
    Ok(LogEntry::CopiedFileWithRename {
        from: file.to_path_buf(),
        to: renamed,
    })
}

/// `fs::copy` carries permission bits; timestamps are restored afterwards.
fn copy_with_metadata(from: &Path, to: &Path) -> Result<(), Error> {
    let copy_err = |source: io::Error| {
        error!("Failed to copy {} -> {}: {}", from.display(), to.display(), source);
        Error::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    };

    fs::copy(from, to).map_err(copy_err)?;

    let metadata = fs::metadata(from).map_err(copy_err)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    let atime = FileTime::from_last_access_time(&metadata);
    filetime::set_file_times(to, atime, mtime).map_err(copy_err)?;

    Ok(())
}
