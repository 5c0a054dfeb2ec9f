//! Run configuration and file filtering rules.
//!
//! A [`RunConfig`] is assembled once from the command line and handed by
//! reference to every stage of the pipeline. It never changes during a run.
//!
//! Filtering is optional and driven by a TOML file passed with `--config`:
//!
//! ```toml
//! [filters]
//! skip_hidden = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", ".DS_Store"]
//! patterns = ["*.tmp", "**/node_modules/**"]
//! extensions = ["bak", "tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use clap::ValueEnum;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How a file's category is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Criterion {
    /// Lowercased file name extension.
    #[value(name = "suffix")]
    Suffix,
    /// MIME type guessed from the file name.
    #[value(name = "mime_name")]
    MimeName,
    /// MIME type sniffed from the file content.
    #[value(name = "mime_content")]
    MimeContent,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Suffix => "suffix",
            Criterion::MimeName => "mime_name",
            Criterion::MimeContent => "mime_content",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filesystem operation used to materialize a file in the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    #[value(name = "move")]
    Move,
    #[value(name = "copy")]
    Copy,
    #[value(name = "hard_link")]
    HardLink,
    #[value(name = "symbolic_link")]
    SymbolicLink,
}

impl Operation {
    /// Verb used in log lines and dry-run output.
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Move => "move",
            Operation::Copy => "copy",
            Operation::HardLink => "hard link",
            Operation::SymbolicLink => "symlink",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Shape of the output tree below each category directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// `category/<file name>`
    #[default]
    #[value(name = "flat_name")]
    FlatName,
    /// `category/<relative path with separators replaced by '_'>`
    #[value(name = "flat_path")]
    FlatPath,
    /// `category/<relative path>`
    #[value(name = "nested")]
    Nested,
}

/// Logging verbosity accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    #[value(name = "debug")]
    Debug,
    #[value(name = "info")]
    Info,
    #[default]
    #[value(name = "warning")]
    Warning,
    #[value(name = "error")]
    Error,
    #[value(name = "critical")]
    Critical,
}

/// Immutable settings for a single run.
#[derive(Debug)]
pub struct RunConfig {
    pub criterion: Criterion,
    pub operation: Operation,
    pub layout: Layout,
    pub remove_leading_dots: bool,
    pub replace_on_collision: bool,
    pub dry_run: bool,
    /// Recurse into symlinked directories while walking the input tree.
    pub follow_symlinks: bool,
    pub show_progress: bool,
    pub input_dir: PathBuf,
    /// Explicit output directory; derived from the input name when `None`.
    pub output_dir: Option<PathBuf>,
    pub filters: CompiledFilters,
}

impl RunConfig {
    /// Creates a configuration with every optional setting at its default.
    pub fn new(input_dir: impl Into<PathBuf>, criterion: Criterion, operation: Operation) -> Self {
        Self {
            criterion,
            operation,
            layout: Layout::default(),
            remove_leading_dots: false,
            replace_on_collision: false,
            dry_run: false,
            follow_symlinks: false,
            show_progress: false,
            input_dir: input_dir.into(),
            output_dir: None,
            filters: CompiledFilters::default(),
        }
    }
}

/// Errors that can occur while loading or compiling a filter file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("failed to read configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Filter file contents as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: FilterRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Skip files whose name starts with a dot.
    #[serde(default)]
    pub skip_hidden: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist; a match here wins over every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact base names.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the input directory.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, compared case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regexes matched against the base name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl FilterConfig {
    /// Loads a filter file from an explicit path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the rules into matchers, validating every pattern.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

/// Pre-compiled filter rules. The default value lets every file through.
#[derive(Debug, Default)]
pub struct CompiledFilters {
    skip_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden: rules.skip_hidden,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Decide whether a file, given by its path relative to the input
    /// directory, takes part in the run.
    ///
    /// Include patterns are checked first; then hidden files, exact names,
    /// extensions, globs and regexes, in that order. Anything left is included.
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return true;
        }

        if self.skip_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}
