//! Command-line interface module for ruletidy.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Rule configuration loading
//! - Organization, preview and in-process undo orchestration
//! - Logging setup

use crate::config::{ConfigFormat, RulesConfig};
use crate::organizer::{OrganizationTask, Organizer};
use crate::output::OutputFormatter;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sort files into folders by extension rules.
#[derive(Debug, Parser)]
#[command(author, version, about, name = "ruletidy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Rules file (TOML, or JSON when the name ends in .json)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print diagnostic logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Represents a CLI command to execute.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move files into their category folders
    Organize {
        /// Directory to organize
        #[arg(value_hint = clap::ValueHint::DirPath)]
        directory: PathBuf,

        /// Also organize files in subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Only report what would be moved
        #[arg(short = 'n', long, overrides_with = "no_dry_run")]
        dry_run: bool,

        /// Move files even when the configuration enables dry runs
        #[arg(long, overrides_with = "dry_run")]
        no_dry_run: bool,

        /// Offer to undo the moves once the run finishes
        #[arg(short, long)]
        undo_prompt: bool,
    },
    /// Show where each file would go without touching anything
    Preview {
        /// Directory to inspect
        #[arg(value_hint = clap::ValueHint::DirPath)]
        directory: PathBuf,

        /// Include files in subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Print the effective rule set
    Rules {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}

impl Cli {
    /// Installs the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence; otherwise only warnings are shown, or
    /// info level with `--verbose`.
    pub fn setup_logging(&self) {
        let default_level = if self.verbose { "info" } else { "warn" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}

/// Runs the parsed command.
///
/// # Errors
///
/// Fails if the configuration cannot be loaded or the task does not pass
/// validation. Individual file failures are reported but are not errors.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let config = RulesConfig::load(cli.config.as_deref()).context("Error loading configuration")?;

    match cli.command {
        Command::Organize {
            directory,
            recursive,
            dry_run,
            no_dry_run,
            undo_prompt,
        } => {
            let task = OrganizationTask::new(&directory, config.rules)
                .recursive(recursive || config.recursive)
                .dry_run(effective_dry_run(dry_run, no_dry_run, config.dry_run));
            organize(task, undo_prompt, &mut io::stdin().lock())
        }
        Command::Preview {
            directory,
            recursive,
        } => {
            let task = OrganizationTask::new(&directory, config.rules)
                .recursive(recursive || config.recursive);
            preview(task)
        }
        Command::Rules { format } => {
            print!("{}", config.render(format)?);
            Ok(())
        }
    }
}

/// Combines the dry-run flags with the configured default.
///
/// `--no-dry-run` wins over the configuration; otherwise either source can
/// turn dry runs on.
fn effective_dry_run(dry_run: bool, no_dry_run: bool, configured: bool) -> bool {
    !no_dry_run && (dry_run || configured)
}

/// Organizes a directory, printing progress, log lines and a summary.
///
/// With `undo_prompt`, a real run that moved anything asks on `input`
/// whether to revert the batch before the process exits.
pub fn organize(
    task: OrganizationTask,
    undo_prompt: bool,
    input: &mut impl BufRead,
) -> anyhow::Result<()> {
    let root = task.root.clone();
    let dry_run = task.dry_run;
    if dry_run {
        OutputFormatter::info(&format!("DRY RUN: Analyzing contents of: {}", root.display()));
    } else {
        OutputFormatter::info(&format!("Organizing contents of: {}", root.display()));
    }

    let mut organizer = Organizer::new(task);
    let pb = OutputFormatter::create_progress_bar();
    let result = organizer.run(
        |percent| pb.set_position(u64::from(percent)),
        |line| pb.suspend(|| println!("{}", OutputFormatter::styled_log_line(line))),
        |stats| {
            pb.finish_and_clear();
            OutputFormatter::summary_table(stats);
        },
    );
    pb.finish_and_clear();
    result.with_context(|| format!("Cannot organize {}", root.display()))?;

    let moved = organizer.undo_log().len();
    if dry_run || !undo_prompt || moved == 0 {
        return Ok(());
    }

    print!("\nUndo these {} moves? [y/N] ", moved);
    io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    if !matches!(answer.trim(), "y" | "Y" | "yes") {
        OutputFormatter::info("Keeping the new layout.");
        return Ok(());
    }

    let report = organizer.undo(|line| println!("{}", OutputFormatter::styled_log_line(line)));
    if report.is_complete_success() {
        OutputFormatter::success(&format!("Restored {} files", report.restored_files));
    } else {
        OutputFormatter::warning(&format!(
            "Restored {} of {} files",
            report.restored_files,
            report.total_processed()
        ));
        for (path, reason) in report.skipped_files.iter().chain(&report.failed_restores) {
            OutputFormatter::error(&format!("{}: {}", path.display(), reason));
        }
    }
    Ok(())
}

/// Prints where every eligible file would be moved.
pub fn preview(task: OrganizationTask) -> anyhow::Result<()> {
    let root = task.root.clone();
    let organizer = Organizer::new(task);
    let entries = organizer
        .preview()
        .with_context(|| format!("Cannot preview {}", root.display()))?;

    let display_root = std::path::absolute(&root).unwrap_or_else(|_| root.clone());
    OutputFormatter::preview(&entries, display_root.as_path());
    Ok(())
}
