//! Command-line interface and run orchestration.
//!
//! This module holds:
//! - the `clap` argument definitions ([`Args`])
//! - directory validation and the output-inside-input guard
//! - the recursive walk that drives classification, destination mapping
//!   and placement for every regular file

use crate::config::{Criterion, Layout, LogLevel, Operation, RunConfig};
use crate::destination::map_destination;
use crate::error::{SetupError, SetupResult};
use crate::file_category::Classifier;
use crate::file_organizer::FileOrganizer;
use crate::output::OutputFormatter;
use clap::{Parser, ValueHint};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Create a categorized image of an unorganized directory (e.g. a disk dump).
///
/// Each contained file is classified according to its suffix or MIME type
/// and moved, copied or linked to a corresponding directory in the output
/// directory.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Criterion by which files are classified
    #[arg(short = 'c', long, value_enum)]
    pub criterion: Criterion,

    /// File system operation used to create the categorized files
    #[arg(short = 'p', long, value_enum)]
    pub operation: Operation,

    /// Image file/directory structure
    #[arg(short = 'i', long = "image-structure", value_enum, default_value = "flat_name")]
    pub layout: Layout,

    /// Unhide hidden files by removing leading dots from their names
    #[arg(long)]
    pub remove_leading_dots: bool,

    /// Replace colliding files instead of creating unique names
    #[arg(long)]
    pub replace_on_collision: bool,

    /// Logging level; less severe messages are ignored
    #[arg(short = 'l', long, value_enum, default_value = "warning")]
    pub log_level: LogLevel,

    /// Don't actually do anything, just show what would be done
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Recurse into symbolic links that point to directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// TOML file with include/exclude filter rules
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print a per-category summary when the run completes
    #[arg(long)]
    pub summary: bool,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,

    /// Output directory for the categorized image
    #[arg(short = 'o', long, value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Input directory
    #[arg(value_name = "INPUT_DIR", value_hint = ValueHint::DirPath)]
    pub input_dir: PathBuf,
}

impl Args {
    /// Builds the run configuration. Filters default to "include everything"
    /// and are set separately by the caller once a filter file is loaded.
    pub fn to_run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.input_dir, self.criterion, self.operation);
        config.layout = self.layout;
        config.remove_leading_dots = self.remove_leading_dots;
        config.replace_on_collision = self.replace_on_collision;
        config.dry_run = self.dry_run;
        config.follow_symlinks = self.follow_symlinks;
        config.show_progress = self.progress;
        config.output_dir = self.output_dir.clone();
        config
    }
}

/// Outcome of a completed run.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// Files successfully placed (or planned, under dry-run).
    pub placed: usize,
    /// Files whose placement failed.
    pub failed: usize,
    /// Files left out by filter rules.
    pub filtered: usize,
    /// Placed files per category label.
    pub categories: HashMap<String, usize>,
}

/// Default output directory name: `<input name>_categorized_by_<criterion>`,
/// relative to the current directory.
///
/// Inputs without a usable final component (`.`, `..`, `/`) take their name
/// from the canonical path instead.
pub fn default_output_dir(input_dir: &Path, criterion: Criterion) -> PathBuf {
    let name = match input_dir.components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
        _ => fs::canonicalize(input_dir)
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "root".to_string()),
    };
    PathBuf::from(format!("{name}_categorized_by_{criterion}"))
}

/// Absolute form of a path that may not exist yet.
///
/// Each existing prefix is canonicalized, the rest is applied lexically,
/// with `..` removing the previous component.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => {
                resolved.push(part);
                if let Ok(canonical) = fs::canonicalize(&resolved) {
                    resolved = canonical;
                }
            }
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
        }
    }
    Ok(resolved)
}

/// Validates the input directory, picks and guards the output directory,
/// and creates it unless this is a dry run.
///
/// Returns the canonical input root and the absolute output root. Nothing on
/// disk is touched before every check has passed.
pub fn prepare_directories(config: &RunConfig) -> SetupResult<(PathBuf, PathBuf)> {
    let input_dir = &config.input_dir;
    if !input_dir.is_dir() {
        return Err(SetupError::InputNotDirectory(input_dir.clone()));
    }

    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(input_dir, config.criterion));

    let input_root = fs::canonicalize(input_dir).map_err(|source| SetupError::Resolve {
        path: input_dir.clone(),
        source,
    })?;
    let output_root = resolve_path(&output_dir).map_err(|source| SetupError::Resolve {
        path: output_dir.clone(),
        source,
    })?;

    if output_root.starts_with(&input_root) {
        return Err(SetupError::OutputInsideInput {
            input: input_root,
            output: output_root,
        });
    }

    if !config.dry_run {
        fs::create_dir(&output_root).map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                SetupError::OutputExists(output_root.clone())
            } else {
                SetupError::CreateOutput {
                    path: output_root.clone(),
                    source,
                }
            }
        })?;
    }

    info!("using input directory `{}'", input_root.display());
    info!("using output directory `{}'", output_root.display());

    Ok((input_root, output_root))
}

/// Regular files, including symlinks that resolve to one. With
/// `follow_links` the walker already reports the target's type.
fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    file_type.is_symlink() && entry.path().is_file()
}

/// Runs the whole pipeline over the input tree.
///
/// Per-file failures are logged and counted; only setup failures return an
/// error.
pub fn run_cli(config: &RunConfig) -> SetupResult<RunReport> {
    let (input_root, output_root) = prepare_directories(config)?;

    let classifier = Classifier::new(config.criterion);
    let spinner = config.show_progress.then(OutputFormatter::create_spinner);

    let mut report = RunReport {
        input_root: input_root.clone(),
        output_root: output_root.clone(),
        ..Default::default()
    };

    let walker = WalkDir::new(&input_root)
        .min_depth(1)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        if !is_regular_file(&entry) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(&input_root) else {
            continue;
        };

        if !config.filters.should_include(relative) {
            debug!("filtered out: {}", relative.display());
            report.filtered += 1;
            continue;
        }

        let category = classifier.classify(entry.path());
        let candidate = map_destination(
            relative,
            &category,
            &output_root,
            config.layout,
            config.remove_leading_dots,
        );

        match FileOrganizer::place(entry.path(), candidate, config) {
            Ok(_) => {
                report.placed += 1;
                *report.categories.entry(category).or_insert(0) += 1;
            }
            Err(e) => {
                warn!("{}", e);
                report.failed += 1;
            }
        }

        if let Some(spinner) = &spinner {
            spinner.inc(1);
        }
    }

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    Ok(report)
}
