use crate::cli::OutputFormat;
use crate::config::{JobConfig, WriteMode};
use crate::errors::{ReplaceError, Result};
use crate::output_formatter::{OutputFormatter, Summary};
use crate::pool::WorkerPool;
use crate::scanner;
use indicatif::{ProgressBar, ProgressStyle};
use regex::bytes::{NoExpand, Regex};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The result of processing a single file.
///
/// A file either yields a replacement count (zero when the token never
/// occurs) or an error, never both.
#[derive(Debug)]
pub struct Outcome {
    pub path: PathBuf,
    pub result: std::result::Result<usize, ReplaceError>,
}

impl Outcome {
    pub fn counted(path: &Path, count: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            result: Ok(count),
        }
    }

    pub fn failed(path: &Path, error: ReplaceError) -> Self {
        Self {
            path: path.to_path_buf(),
            result: Err(error),
        }
    }

    /// The replacement count, or `None` if processing failed.
    pub fn replacements(&self) -> Option<usize> {
        self.result.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&ReplaceError> {
        self.result.as_ref().err()
    }

    /// `true` if at least one occurrence was (or would be) replaced.
    pub fn is_touched(&self) -> bool {
        self.replacements().is_some_and(|count| count > 0)
    }
}

/// Core engine for literal find-and-replace in a single file.
///
/// Every byte of the old token is escaped before compilation, so the matcher
/// only ever finds the exact byte sequence, whether or not it is valid UTF-8. Matches are leftmost-first and never
/// overlap: in `"aaa"` the token `"aa"` occurs once.
pub struct Replacer {
    matcher: Regex,
    replacement: Vec<u8>,
    dry_run: bool,
    write_mode: WriteMode,
}

impl Replacer {
    /// Creates a new `Replacer` from a `JobConfig`.
    pub fn new(config: &JobConfig) -> Result<Self> {
        if config.old_token.is_empty() {
            return Err("the old token must not be empty".into());
        }

        Ok(Self {
            matcher: Regex::new(&literal_pattern(&config.old_token))?,
            replacement: config.new_token.clone(),
            dry_run: config.dry_run,
            write_mode: config.write_mode,
        })
    }

    /// Counts the non-overlapping occurrences of the old token in `content`.
    pub fn count(&self, content: &[u8]) -> usize {
        self.matcher.find_iter(content).count()
    }

    /// Returns `content` with every occurrence of the old token replaced.
    ///
    /// The new token is inserted verbatim; `$` is not treated as a group reference.
    pub fn apply(&self, content: &[u8]) -> Vec<u8> {
        self.matcher
            .replace_all(content, NoExpand(&self.replacement))
            .into_owned()
    }

    /// Processes one file and reports what happened to it.
    ///
    /// Failures are captured in the returned `Outcome` rather than propagated,
    /// so one bad file never stops the run.
    pub fn replace_file(&self, path: &Path) -> Outcome {
        match self.try_replace_file(path) {
            Ok(count) => Outcome::counted(path, count),
            Err(e) => Outcome::failed(path, e),
        }
    }

    fn try_replace_file(&self, path: &Path) -> std::result::Result<usize, ReplaceError> {
        let content = fs::read(path).map_err(ReplaceError::Read)?;

        let count = self.count(&content);
        if count == 0 || self.dry_run {
            return Ok(count);
        }

        let new_content = self.apply(&content);
        let perms = fs::metadata(path).map_err(ReplaceError::Stat)?.permissions();

        match self.write_mode {
            WriteMode::InPlace => {
                // Opening an existing file for writing leaves its mode alone.
                fs::write(path, &new_content).map_err(ReplaceError::Write)?;
            }
            WriteMode::Atomic => {
                let parent = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."));
                let mut temp_file = NamedTempFile::new_in(parent).map_err(ReplaceError::Write)?;
                temp_file
                    .write_all(&new_content)
                    .map_err(ReplaceError::Write)?;
                fs::set_permissions(temp_file.path(), perms).map_err(ReplaceError::Write)?;
                temp_file
                    .persist(path)
                    .map_err(|e| ReplaceError::Write(e.error))?;
            }
        }

        Ok(count)
    }
}

/// Builds a pattern matching exactly `token`, one `\xNN` escape per byte.
///
/// Unicode mode is off so each escape matches a single raw byte.
fn literal_pattern(token: &[u8]) -> String {
    let mut pattern = String::with_capacity(5 + token.len() * 4);
    pattern.push_str("(?-u)");
    for byte in token {
        pattern.push_str(&format!("\\x{byte:02X}"));
    }
    pattern
}

/// The main entry point for a replacement run.
///
/// This function orchestrates the whole pipeline:
/// 1. It collects the target files (a single file, or an eligible subset of a tree).
/// 2. It fans the files out over a `WorkerPool`, one `Outcome` per file.
/// 3. It writes the report for the collected outcomes to `writer`.
///
/// Returns `None` when there was nothing to process. Per-file failures are
/// part of the report and the returned `Summary`; only fatal conditions are
/// returned as `Err`.
pub fn run_replace<W: Write>(
    config: &JobConfig,
    target: &Path,
    format: OutputFormat,
    show_progress: bool,
    writer: &mut W,
) -> Result<Option<Summary>> {
    let files = scanner::collect_files(target)?;
    if files.is_empty() {
        writeln!(writer, "No eligible files found under {}", target.display())?;
        return Ok(None);
    }

    let replacer = Replacer::new(config)?;

    let progress = if show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .map_err(|e| e.to_string())?
                .progress_chars("##-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let pool = WorkerPool::new(config.workers).with_progress(progress.clone());
    let outcomes = pool.run(&files, |path| replacer.replace_file(path))?;
    progress.finish_and_clear();

    for outcome in &outcomes {
        if let Some(e) = outcome.error() {
            log::warn!("Failed to process {}: {}", outcome.path.display(), e);
        }
    }

    let formatter = OutputFormatter::new(format, config.dry_run);
    formatter.write_report(writer, &outcomes)?;

    Ok(Some(Summary::from_outcomes(&outcomes)))
}
