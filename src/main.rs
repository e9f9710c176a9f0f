mod cli;
mod logging;
mod progress_bar;
mod prompt;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, MergeArgs, PreviewArgs};
use colored::*;
use dotenv::dotenv;
use indicatif::HumanBytes;
use merge_folders::{estimate, AppConfig, MergeController, MergeOutcome, MergeRequest, PreviewStats};
use progress_bar::CliProgress;
use tracing::{error, info, warn};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Logging is configured from AppConfig, so a bad config can only go to stderr
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let _guard = logging::init_logger(&config);

    let args = Cli::parse();

    match args.command {
        Some(Commands::Preview(preview_args)) => {
            if let Err(err) = run_preview(&config, preview_args) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::Merge(merge_args)) => match run_merge(&config, merge_args) {
            Ok(outcome) if outcome.failed => process::exit(2),
            Ok(_) => {}
            Err(err) => {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        },
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn resolve_sources(args: Vec<PathBuf>, config: &AppConfig) -> Vec<PathBuf> {
    if !args.is_empty() {
        return args;
    }
    config.source_paths.iter().map(PathBuf::from).collect()
}

fn run_preview(config: &AppConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let sources = resolve_sources(args.sources, config);
    if sources.is_empty() {
        bail!("Please select folders to merge.");
    }

    let stats = estimate(&sources);
    print_preview(None, &stats);
    Ok(())
}

fn run_merge(config: &AppConfig, args: MergeArgs) -> anyhow::Result<MergeOutcome> {
    let sources = resolve_sources(args.sources, config);
    let dest = match args.dest.or_else(|| config.destination.as_ref().map(PathBuf::from)) {
        Some(dest) => dest,
        None => bail!("Please select a destination folder."),
    };

    let request = if args.merged_suffix || config.merged_suffix {
        MergeRequest::with_merged_destination(&sources, &dest)?
    } else {
        MergeRequest::new(&sources, &dest)?
    };
    info!("Processing directories: {:?}", request.sources());

    let stats = estimate(request.sources());
    print_preview(Some(request.destination()), &stats);

    let assume_yes = args.yes || config.assume_yes;
    if !assume_yes && !prompt::prompt_confirm("Start merge?", Some(false))? {
        println!("Merge not started.");
        process::exit(0);
    }

    let mut controller = MergeController::new();
    let handle = controller.start(request)?;

    let signal = handle.cancellation();
    ctrlc::set_handler(move || {
        if signal.cancel() {
            eprintln!("Canceling after the current item...");
        }
    })
    .context("installing Ctrl-C handler")?;

    let progress = CliProgress::new(stats.total_items());
    let mut finished = None;
    handle.dispatch(
        |event| progress.update(event),
        |outcome| finished = Some(outcome),
    );
    progress.finish();

    let outcome = finished.context("merge ended without an outcome")?;
    print_summary(&outcome, args.show_log);

    let export_target = args
        .export_log
        .or_else(|| config.export_log.as_ref().map(PathBuf::from));
    if let Some(target) = export_target {
        export_log(&outcome, &target)?;
    }

    Ok(outcome)
}

fn print_preview(destination: Option<&Path>, stats: &PreviewStats) {
    println!();
    println!("{}", "Review merge details".bold());
    println!("  Total size:   {}", HumanBytes(stats.total_bytes));
    println!("  Files:        {}", stats.file_count);
    println!("  Folders:      {}", stats.dir_count);
    if let Some(destination) = destination {
        println!("  Destination:  {}", destination.display());
    }
    println!();
}

fn print_summary(outcome: &MergeOutcome, show_log: bool) {
    let (minutes, seconds) = outcome.elapsed_minutes_seconds();

    let headline = if outcome.failed {
        "Merge Failed".red().bold()
    } else if outcome.canceled {
        "Merge Canceled".yellow().bold()
    } else {
        "Merge Complete".green().bold()
    };
    println!("{}", headline);
    println!(
        "  Elapsed Time: {}",
        format!("{} min {} sec", minutes, seconds).green()
    );
    println!(
        "  Log entries:  {}",
        format!("{}", outcome.log.len()).cyan()
    );
    if let Some(err) = &outcome.error {
        println!("  Error:        {}", err.as_str().red());
    }

    if show_log {
        println!();
        if outcome.log.is_empty() {
            println!("No log entries were recorded.");
        } else {
            for line in outcome.log.lines() {
                println!("{}", line);
            }
        }
    }
}

fn export_log(outcome: &MergeOutcome, target: &Path) -> anyhow::Result<()> {
    if outcome.log.is_empty() {
        warn!("There are no logs to export.");
        return Ok(());
    }

    let path = if target.is_dir() {
        target.join(format!(
            "merge_log_{}.txt",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    } else {
        target.to_path_buf()
    };

    outcome
        .log
        .export(&path)
        .with_context(|| format!("Could not save logs to {}", path.display()))?;
    info!("Log exported to {}", path.display());
    Ok(())
}
