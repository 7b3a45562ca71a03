//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status
//! lines, the run progress bar, the per-category summary table and preview
//! listings. The engine itself never prints; the CLI routes its callbacks
//! through here.

use crate::organizer::Stats;
use crate::preview::{PreviewEntry, PreviewTarget};
use crate::rules::UNORGANIZED;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a percentage progress bar (0 to 100) for an organization run.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ruletidy::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar();
    /// pb.set_position(50);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Styles one engine log line by what it reports.
    pub fn styled_log_line(line: &str) -> String {
        if line.starts_with("Error") || line.starts_with("An unexpected error") {
            format!("{} {}", "✗".red(), line.red())
        } else if line.starts_with("Moved") {
            format!("{} {}", "✓".green(), line)
        } else if line.starts_with("Would move") {
            format!("{}", format!("[DRY RUN] {}", line).yellow())
        } else if line.starts_with("Unrecognized") {
            format!("{}", line.dimmed())
        } else {
            line.bold().to_string()
        }
    }

    /// Prints a summary table with file counts by category.
    ///
    /// Rows are sorted by name with `Unorganized` last.
    pub fn summary_table(stats: &Stats) {
        Self::header("SUMMARY");

        let mut categories: Vec<_> = stats.iter().collect();
        categories.sort_by_key(|&(name, _)| (name == UNORGANIZED, name.clone()));

        let max_category_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            let count_text = if category.as_str() == UNORGANIZED {
                count.to_string().yellow()
            } else {
                count.to_string().green()
            };
            println!(
                "{:<width$} | {} {}",
                category,
                count_text,
                plural(**count),
                width = max_category_len
            );
        }

        let total: usize = stats.values().sum();
        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = max_category_len
        );
    }

    /// Prints a preview listing, paths shown relative to `root` when possible.
    pub fn preview(entries: &[PreviewEntry], root: &Path) {
        if entries.is_empty() {
            Self::info("No files found to organize.");
            return;
        }

        Self::header("PREVIEW");
        for entry in entries {
            let source = entry.source.strip_prefix(root).unwrap_or(&entry.source);
            let target = match &entry.target {
                PreviewTarget::Destination(path) => path
                    .strip_prefix(root)
                    .unwrap_or(path)
                    .display()
                    .to_string()
                    .green(),
                PreviewTarget::Unorganized => entry.target.to_string().dimmed(),
                PreviewTarget::Error(_) => entry.target.to_string().red(),
            };
            println!(" - {} → {}", source.display(), target);
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
