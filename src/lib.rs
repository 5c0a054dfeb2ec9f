//! categorize - build a categorized image of an unorganized directory tree
//!
//! Every regular file below an input directory is classified by suffix, by
//! MIME type guessed from its name, or by MIME type sniffed from its content,
//! and then moved, copied, hard linked or symlinked into a per-category
//! directory of a fresh output tree.

pub mod cli;
pub mod config;
pub mod destination;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod output;

pub use config::{
    CompiledFilters, ConfigError, Criterion, FilterConfig, Layout, LogLevel, Operation, RunConfig,
};
pub use error::SetupError;
pub use file_category::{Classifier, MimeTable, UNKNOWN_CATEGORY};
pub use file_organizer::{FileOrganizer, OperationError};

pub use cli::{Args, RunReport, run_cli};
