use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for fatal, run-level failures in `bulkrep`.
///
/// Anything that aborts the run before (or instead of) per-file processing
/// ends up here. Failures tied to a single file are [`ReplaceError`]s and are
/// carried inside an [`Outcome`](crate::replacer::Outcome) instead.
#[derive(Error, Debug)]
pub enum Error {
    /// An error related to file system I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The target path given on the command line does not exist.
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// An error from the `walkdir` crate while traversing the target tree.
    #[error("directory traversal failed: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// The old token could not be compiled into a literal matcher.
    #[error("Pattern compilation failed: {0}")]
    Regex(#[from] regex::Error),

    /// A general configuration-related error.
    #[error("Config error: {0}")]
    Config(String),

    /// An error that occurred while building the Rayon thread pool.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An error related to CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An error related to JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, bulkrep::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}

/// A recoverable failure while processing one file.
///
/// These never abort the run. They are reported next to the offending path
/// and counted in the summary's error tally.
#[derive(Error, Debug)]
pub enum ReplaceError {
    /// The file could not be opened or read.
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    /// The file's metadata (and so its permissions) could not be read.
    #[error("stat failed: {0}")]
    Stat(#[source] std::io::Error),

    /// The replaced contents could not be written back.
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    /// Processing this file panicked; the worker recovered and moved on.
    #[error("processing panicked: {0}")]
    Panicked(String),
}
