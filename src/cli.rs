//! Command-line surface of `bulkrep`.
//!
//! Tokens are taken as raw `OsString`s so that bytes which are not valid
//! UTF-8 (Latin-1 text, for instance) can still be searched for and written.

use clap::Parser;
use clap::builder::{OsStringValueParser, TypedValueParser};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Bulk literal text substitution across a file tree.
///
/// `bulkrep` finds every text file under a path, replaces each occurrence of
/// one literal token with another, and reports what it changed. Files are
/// processed in parallel by a fixed pool of worker threads.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "⚡ Parallel literal find-and-replace across a file tree",
    long_about = "bulkrep - Replace one literal token with another in every text file under a path.

Tokens are matched byte-for-byte; nothing is interpreted as a pattern.
Directories named .git, node_modules and vendor are skipped.

QUICK EXAMPLES:
  bulkrep -o foo -n bar -p .                 # Replace foo with bar under the current dir
  bulkrep -o foo -n bar -p src/ --dry-run    # Preview counts without writing
  bulkrep -o 'old()' -n '' -p main.go        # Delete a token from one file
  bulkrep -o v1 -n v2 -p . -f json           # Machine-readable report"
)]
pub struct Args {
    /// The literal token to search for. Must not be empty.
    #[arg(short, long, value_parser = OsStringValueParser::new().try_map(non_empty_token))]
    pub old: OsString,

    /// The token to write in place of each match. May be empty to delete matches.
    #[arg(short, long, value_parser = clap::value_parser!(OsString))]
    pub new: OsString,

    /// The file or directory to process.
    #[arg(short, long)]
    pub path: PathBuf,

    /// The number of parallel worker threads. Defaults to the number of logical CPU cores.
    #[arg(short = 'w', long = "workers", env = "BULKREP_WORKERS")]
    pub workers: Option<usize>,

    /// Report what would change without modifying any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Write through a temporary file that is renamed over the original.
    #[arg(long)]
    pub atomic: bool,

    /// The output format for the report.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Show a progress bar on stderr while files are processed.
    #[arg(long)]
    pub progress: bool,

    /// Log debug details to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Defines the possible output formats for the run report.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A simple, human-readable text report.
    Text,
    /// JSON format, suitable for machine processing.
    Json,
    /// Comma-Separated Values, one row per touched or failed file.
    Csv,
}

fn non_empty_token(token: OsString) -> Result<OsString, &'static str> {
    if token.is_empty() {
        Err("the token must not be empty")
    } else {
        Ok(token)
    }
}

/// Returns the raw bytes of a command-line token.
#[cfg(unix)]
pub fn token_bytes(token: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    token.as_bytes().to_vec()
}

/// Returns the raw bytes of a command-line token.
#[cfg(not(unix))]
pub fn token_bytes(token: &OsStr) -> Vec<u8> {
    token.as_encoded_bytes().to_vec()
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
