use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Folder,
    File,
}

/// Emitted once per directory entered and once per file handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    pub source_path: PathBuf,
    /// Relative to the source root currently being processed.
    pub relative_path: PathBuf,
    pub items_processed: u64,
}

/// Trait for observing merge progress.
///
/// The controller implements it with a channel sender, the CLI with an
/// indicatif bar. All methods have default no-op implementations.
pub trait MergeReporter: Send + Sync {
    fn on_folder(&self, _event: &ProgressEvent) {}
    fn on_file(&self, _event: &ProgressEvent) {}

    fn report(&self, event: &ProgressEvent) {
        match event.kind {
            ProgressKind::Folder => self.on_folder(event),
            ProgressKind::File => self.on_file(event),
        }
    }
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl MergeReporter for SilentReporter {}
