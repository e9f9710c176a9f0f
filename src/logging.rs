use merge_folders::AppConfig;
use std::io::IsTerminal;
use std::path::Path;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "logs/merge-folders.log";

/// Turn the configured level into a filter directive. A bare level applies to
/// this crate only and everything else stays at `warn`; anything containing
/// `=` or `,` is taken as a full directive.
fn filter_directive(level: Option<&str>) -> String {
    let level = level.map(str::trim).filter(|l| !l.is_empty()).unwrap_or(DEFAULT_LEVEL);
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("warn,merge_folders={}", level)
    }
}

/// Where the file layer writes, or `None` when `log_file` is set to "".
fn log_file_target(log_file: Option<&str>) -> Option<(&Path, &Path)> {
    let path = Path::new(log_file.unwrap_or(DEFAULT_LOG_FILE));
    let name = path.file_name()?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    Some((dir, Path::new(name)))
}

/// Console diagnostics go to stderr so they do not fight the progress bar and
/// summary on stdout. The returned guard flushes the file layer on drop.
pub fn init_logger(config: &AppConfig) -> Option<WorkerGuard> {
    let filter_layer = EnvFilter::new(filter_directive(config.log_level.as_deref()));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal());

    let (file_layer, guard) = match log_file_target(config.log_file.as_deref()) {
        Some((dir, name)) => {
            let appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_thread_names(true)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(filter_layer)
        .init();

    debug!(
        "Diagnostics at {:?}, file {:?}",
        config.log_level, config.log_file
    );

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_is_scoped_to_crate() {
        assert_eq!(filter_directive(None), "warn,merge_folders=info");
        assert_eq!(filter_directive(Some(" debug ")), "warn,merge_folders=debug");
        assert_eq!(filter_directive(Some("")), "warn,merge_folders=info");
    }

    #[test]
    fn test_full_directive_passes_through() {
        assert_eq!(
            filter_directive(Some("merge_folders=trace,walkdir=debug")),
            "merge_folders=trace,walkdir=debug"
        );
    }

    #[test]
    fn test_log_file_target() {
        assert_eq!(
            log_file_target(None),
            Some((Path::new("logs"), Path::new("merge-folders.log")))
        );
        assert_eq!(
            log_file_target(Some("run.log")),
            Some((Path::new("."), Path::new("run.log")))
        );
        assert_eq!(log_file_target(Some("")), None);
    }
}
