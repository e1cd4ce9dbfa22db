use crate::cli::{self, Args};
use crate::errors::Result;

/// How replaced contents are written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and rewrite the existing file. Keeps its inode, owner and mode.
    #[default]
    InPlace,
    /// Write a temporary file next to the original, copy the original
    /// permissions onto it, then rename it over the original.
    Atomic,
}

/// Settings for one replacement run.
///
/// Built once before any file is touched and then shared read-only by every
/// worker for the rest of the run.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// The literal bytes to search for. Never empty.
    pub old_token: Vec<u8>,
    /// The replacement bytes. Empty means matches are deleted.
    pub new_token: Vec<u8>,
    /// Number of worker threads, always at least 1.
    pub workers: usize,
    /// If `true`, counts are computed but nothing is written.
    pub dry_run: bool,
    pub write_mode: WriteMode,
}

impl JobConfig {
    /// Creates a configuration with the default worker count and write mode.
    pub fn new(old_token: impl Into<Vec<u8>>, new_token: impl Into<Vec<u8>>) -> Result<Self> {
        let old_token = old_token.into();
        if old_token.is_empty() {
            return Err("the old token must not be empty".into());
        }

        Ok(Self {
            old_token,
            new_token: new_token.into(),
            workers: default_workers(),
            dry_run: false,
            write_mode: WriteMode::default(),
        })
    }

    /// Builds the configuration from parsed command-line arguments.
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Self::new(cli::token_bytes(&args.old), cli::token_bytes(&args.new))?
            .with_dry_run(args.dry_run)
            .with_write_mode(if args.atomic {
                WriteMode::Atomic
            } else {
                WriteMode::InPlace
            });

        Ok(match args.workers {
            Some(workers) => config.with_workers(workers),
            None => config,
        })
    }

    /// Sets the worker count. Zero is clamped to one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }
}

/// The number of logical CPU cores, never less than one.
pub fn default_workers() -> usize {
    num_cpus::get().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_empty_old_token_is_a_config_error() {
        let err = JobConfig::new("", "x").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_empty_new_token_is_allowed() {
        let config = JobConfig::new("foo", "").unwrap();
        assert!(config.new_token.is_empty());
        assert!(config.workers >= 1);
        assert_eq!(config.write_mode, WriteMode::InPlace);
    }

    #[test]
    fn test_tokens_are_raw_bytes() {
        let config = JobConfig::new(b"caf\xE9".to_vec(), Vec::new()).unwrap();
        assert_eq!(config.old_token, b"caf\xE9");
        assert!(config.new_token.is_empty());
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        let config = JobConfig::new("a", "b").unwrap().with_workers(0);
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_from_args() {
        let args = Args::try_parse_from([
            "bulkrep", "-o", "a", "-n", "b", "-p", ".", "-w", "0", "--dry-run", "--atomic",
        ])
        .unwrap();
        let config = JobConfig::from_args(&args).unwrap();
        assert_eq!(config.old_token, b"a");
        assert_eq!(config.new_token, b"b");
        assert_eq!(config.workers, 1);
        assert!(config.dry_run);
        assert_eq!(config.write_mode, WriteMode::Atomic);
    }
}
