use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "merge-folders")]
#[command(about = "Merge several folders into one without overwriting anything", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count files, folders and bytes the merge would copy
    Preview(PreviewArgs),
    /// Merge source folders into a destination folder
    Merge(MergeArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Source folders (defaults to `source_paths` from Config.toml)
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Source folders, merged in the order given
    pub sources: Vec<PathBuf>,

    /// Destination folder
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Merge into `<dest>/<first source name>_merged`
    #[arg(long)]
    pub merged_suffix: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Write the merge log to this file when done
    #[arg(long)]
    pub export_log: Option<PathBuf>,

    /// Print every log entry after the summary
    #[arg(long)]
    pub show_log: bool,
}
