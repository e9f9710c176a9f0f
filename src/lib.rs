pub mod cancel;
pub mod collision;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod merge_log;
pub mod path_map;
pub mod progress;
pub mod request;
pub mod walk;

pub use cancel::CancellationSignal;
pub use config::AppConfig;
pub use controller::{MergeController, MergeEvent, MergeHandle, MergeOutcome};
pub use engine::{MergeEngine, MergeFailure, RunStatus};
pub use error::Error;
pub use estimate::{estimate, PreviewStats};
pub use merge_log::{LogEntry, MergeLog};
pub use progress::{MergeReporter, ProgressEvent, ProgressKind, SilentReporter};
pub use request::MergeRequest;
