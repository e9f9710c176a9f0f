use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid path: {} is not beneath {}", .path.display(), .root.display())]
    InvalidPath { path: PathBuf, root: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to create folder {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to copy {} -> {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("A merge is already running")]
    RunInProgress,
}

pub type Result<T> = std::result::Result<T, Error>;
