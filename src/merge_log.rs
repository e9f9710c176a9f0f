use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One action taken during a merge, rendered as a single human-readable line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    DestinationCreated(PathBuf),
    CreatedFolder(PathBuf),
    CopiedFile { from: PathBuf, to: PathBuf },
    CopiedFileWithRename { from: PathBuf, to: PathBuf },
    Error(String),
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::DestinationCreated(path) => {
                write!(f, "Destination created: {}", path.display())
            }
            LogEntry::CreatedFolder(path) => write!(f, "Created folder: {}", path.display()),
            LogEntry::CopiedFile { from, to } => {
                write!(f, "Copied file: {} -> {}", from.display(), to.display())
            }
            LogEntry::CopiedFileWithRename { from, to } => write!(
                f,
                "Copied file with rename: {} -> {}",
                from.display(),
                to.display()
            ),
            LogEntry::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Append-only record of a run, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeLog {
    entries: Vec<LogEntry>,
}

impl MergeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_where(&self, pred: impl Fn(&LogEntry) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(e)).count()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    /// Lines joined with `\n`, no trailing newline.
    pub fn to_text(&self) -> String {
        self.lines().join("\n")
    }

    /// Write the log verbatim to `path`.
    pub fn export(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_text())
    }
}
