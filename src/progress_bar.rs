use indicatif::{ProgressBar, ProgressStyle};
use merge_folders::{ProgressEvent, ProgressKind};

/// Progress bar sized from the preview (files + folders).
///
/// Fed on the main thread from the controller's event channel.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new(total_items: u64) -> Self {
        let bar = ProgressBar::new(total_items);
        bar.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    pub fn update(&self, event: &ProgressEvent) {
        // The tree can grow after the preview; never run past the end.
        let len = self.bar.length().unwrap_or(0);
        self.bar.set_position(event.items_processed.min(len));

        let status = match event.kind {
            ProgressKind::Folder => "Processing folder",
            ProgressKind::File => "Copying file",
        };
        self.bar
            .set_message(format!("{}: {}", status, event.relative_path.display()));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
