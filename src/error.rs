//! Error types for fpsort.
//!
//! Every failure is fatal for the run; variants carry the file or
//! destination involved so the diagnostic names what broke.

use std::io;

use thiserror::Error;

use crate::common::io_error_msg;

/// Result type alias using SortError
pub type Result<T> = std::result::Result<T, SortError>;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("open failed: {path}: {}", io_error_msg(.source))]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("mmap failed: {path}: {}", io_error_msg(.source))]
    Map {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("write failed: {dest}: {}", io_error_msg(.source))]
    Write {
        dest: String,
        #[source]
        source: io::Error,
    },

    #[error("close failed: {dest}: {}", io_error_msg(.source))]
    Close {
        dest: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Config(String),

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SortError {
    pub(crate) fn open(path: &str, source: io::Error) -> Self {
        SortError::Open {
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn map(path: &str, source: io::Error) -> Self {
        SortError::Map {
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn write(dest: &str, source: io::Error) -> Self {
        SortError::Write {
            dest: dest.to_string(),
            source,
        }
    }

    pub(crate) fn close(dest: &str, source: io::Error) -> Self {
        SortError::Close {
            dest: dest.to_string(),
            source,
        }
    }
}
