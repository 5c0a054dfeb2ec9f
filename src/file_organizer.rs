//! Placing files into the output tree.
//!
//! [`FileOrganizer::place`] runs the filesystem side of the per-file
//! pipeline: create the parent directory, settle name collisions, then
//! move, copy or link. Every failure comes back as an [`OperationError`]
//! so the caller can log it and carry on with the next file.

use crate::config::{Operation, RunConfig};
use crate::destination::resolve_collision;
use crate::output::OutputFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Per-file failures. None of these stop the run.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to clear name collision at {}: {source}", .destination.display())]
    Collision {
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot resolve link target {}: {source}", .path.display())]
    ResolveSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "failed to {operation} {} to {}: {source}",
        .from.display(),
        .to.display()
    )]
    Operation {
        operation: Operation,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for placement operations.
pub type OrganizeResult<T> = Result<T, OperationError>;

/// Performs the filesystem operations of a run.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Places `source` at `candidate` (or a collision-free variant of it)
    /// and returns the path actually used.
    ///
    /// Under dry-run nothing is created or resolved; the candidate is
    /// reported and returned as is.
    pub fn place(source: &Path, candidate: PathBuf, config: &RunConfig) -> OrganizeResult<PathBuf> {
        if config.dry_run {
            Self::execute(source, &candidate, config.operation, true)?;
            return Ok(candidate);
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(|source| OperationError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let destination = resolve_collision(candidate.clone(), config.replace_on_collision)
            .map_err(|source| OperationError::Collision {
                destination: candidate,
                source,
            })?;

        Self::execute(source, &destination, config.operation, false)?;
        Ok(destination)
    }

    /// Performs `operation` from `source` to `destination`, or only reports
    /// it when `dry_run` is set.
    ///
    /// Moves are plain renames and fail across filesystems. Links are made
    /// from the canonical absolute path of the source, so a symlinked source
    /// yields a link to the file it resolves to.
    pub fn execute(
        source: &Path,
        destination: &Path,
        operation: Operation,
        dry_run: bool,
    ) -> OrganizeResult<()> {
        let target = match operation {
            Operation::HardLink | Operation::SymbolicLink => {
                fs::canonicalize(source).map_err(|e| OperationError::ResolveSource {
                    path: source.to_path_buf(),
                    source: e,
                })?
            }
            _ => source.to_path_buf(),
        };

        if dry_run {
            OutputFormatter::dry_run_action(operation, &target, destination);
            return Ok(());
        }

        debug!(
            from = %target.display(),
            to = %destination.display(),
            "{}",
            operation.verb()
        );

        let result = match operation {
            Operation::Move => fs::rename(&target, destination),
            Operation::Copy => fs::copy(&target, destination).map(|_| ()),
            Operation::HardLink => fs::hard_link(&target, destination),
            Operation::SymbolicLink => symlink_file(&target, destination),
        };

        result.map_err(|e| OperationError::Operation {
            operation,
            from: target,
            to: destination.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
