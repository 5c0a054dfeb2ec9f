//! Terminal output for the person running the tool.
//!
//! Diagnostics go through `tracing`; this module only prints what the user
//! explicitly asked to see: the dry-run plan, the summary table and the
//! progress spinner.

use crate::config::Operation;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints one planned action of a dry run.
    pub fn dry_run_action(operation: Operation, source: &Path, destination: &Path) {
        println!(
            "{}",
            format!(
                "[DRY RUN] would {} {} -> {}",
                operation.verb(),
                source.display(),
                destination.display()
            )
            .yellow()
        );
    }

    /// Creates a spinner for runs of unknown length. It draws to stderr and
    /// stays hidden when stderr is not a terminal.
    pub fn create_spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {pos} files {msg}")
        {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    /// Prints per-category counts followed by totals.
    pub fn summary_table(
        category_counts: &HashMap<String, usize>,
        placed: usize,
        failed: usize,
        filtered: usize,
    ) {
        println!("\n{}", "SUMMARY".bold());

        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let width = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in &categories {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(**count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            placed.to_string().green().bold(),
            plural(placed),
            width = width
        );
        if filtered > 0 {
            println!(
                "{:<width$} | {} {}",
                "Filtered",
                filtered.to_string().cyan(),
                plural(filtered),
                width = width
            );
        }
        if failed > 0 {
            println!(
                "{:<width$} | {} {}",
                "Failed".red(),
                failed.to_string().red().bold(),
                plural(failed),
                width = width
            );
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
