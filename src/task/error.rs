//! Task errors.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;
use crate::transform::StageError;

/// Errors raised while running a task.
///
/// `Compile` is recoverable: the run ends without writing and the process
/// keeps going. Everything else is fatal.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{}: {message}", path.display())]
    Compile { path: PathBuf, message: String },

    #[error("IO error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("source directory `{}` does not exist", .0.display())]
    MissingSource(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

impl TaskError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Compile { .. })
    }
}

impl From<StageError> for TaskError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Compile { path, message } => Self::Compile { path, message },
            StageError::Io { path, source } => Self::Io { path, source },
            StageError::Other(message) => Self::Other(message),
        }
    }
}
