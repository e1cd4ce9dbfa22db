//! `bulkrep` is a library for bulk literal find-and-replace across a file tree.
//!
//! It provides the core logic for the `bulkrep` command-line tool but can also be
//! used as a standalone library. The main components are:
//!
//! - `scanner`: Collects the files to process, pruning `.git`, `node_modules`
//!   and `vendor` directories and keeping only known text extensions.
//! - `Replacer`: Counts and replaces one literal token in a single file, with
//!   support for dry runs and atomic writes.
//! - `WorkerPool`: Fans a file list out over a fixed number of worker threads
//!   and collects exactly one `Outcome` per file.
//! - `output_formatter`: Folds outcomes into a `Summary` and renders the report
//!   as text, JSON or CSV.
//!
//! Per-file failures never abort a run; they are carried in each `Outcome`.

pub mod cli;
pub mod config;
pub mod errors;
pub mod output_formatter;
pub mod pool;
pub mod replacer;
pub mod scanner;

// Re-export main types for easier access by library users.
pub use config::{JobConfig, WriteMode};
pub use errors::{Error, ReplaceError, Result};
pub use output_formatter::{OutputFormatter, Summary};
pub use pool::WorkerPool;
pub use replacer::{Outcome, Replacer};
