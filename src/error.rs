//! Fatal errors that abort a run before any file is processed.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{}: does not exist or is not a directory", .0.display())]
    InputNotDirectory(PathBuf),

    #[error("cannot resolve {}: {source}", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "the output directory {} is inside the input directory {}; that could create an infinite loop",
        .output.display(),
        .input.display()
    )]
    OutputInsideInput { input: PathBuf, output: PathBuf },

    #[error("output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SetupResult<T> = Result<T, SetupError>;
