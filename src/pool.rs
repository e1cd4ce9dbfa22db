use crate::errors::{ReplaceError, Result};
use crate::replacer::Outcome;
use indicatif::ProgressBar;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

/// A fixed-size pool of worker threads that processes a list of files.
///
/// Every worker pulls the next unclaimed path from a shared cursor over the
/// (read-only) file list and pushes one `Outcome` per path into a results
/// channel. `run` blocks until all workers have finished; only then is the
/// channel closed and drained, so no outcome can be lost.
pub struct WorkerPool {
    workers: usize,
    progress: ProgressBar,
}

impl WorkerPool {
    /// Creates a pool with `workers` threads. Zero is clamped to one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    /// Ticks `progress` once for every finished file.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Processes every file exactly once and returns all outcomes, unordered.
    ///
    /// A panic inside `process` is confined to the file being processed: it
    /// becomes that file's `Outcome` and the worker carries on with the next one.
    pub fn run<F>(&self, files: &[PathBuf], process: F) -> Result<Vec<Outcome>>
    where
        F: Fn(&Path) -> Outcome + Sync,
    {
        let workers = self.workers.min(files.len()).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bulkrep-worker-{i}"))
            .build()?;
        log::debug!("Processing {} files with {} workers", files.len(), workers);

        // Sized for every outcome, so a send never blocks.
        let (tx, rx) = mpsc::sync_channel(files.len());
        let next = &AtomicUsize::new(0);
        let process = &process;
        let progress = &self.progress;

        // `tx` moves into the scope and is dropped once the workers are spawned;
        // the channel closes when the last worker exits and its clone goes with it.
        pool.scope(move |scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let mut handled = 0usize;
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(path) = files.get(index) else {
                            break;
                        };
                        let outcome = isolate(path, process);
                        progress.inc(1);
                        handled += 1;
                        if tx.send(outcome).is_err() {
                            break;
                        }
                    }
                    log::debug!("Worker {worker} finished after {handled} files");
                });
            }
        });

        // `scope` has joined every worker, so the channel is closed and fully populated.
        let outcomes: Vec<Outcome> = rx.into_iter().collect();
        debug_assert_eq!(outcomes.len(), files.len());

        Ok(outcomes)
    }
}

/// Runs `process` for one path, turning a panic into a failed `Outcome`.
fn isolate<F>(path: &Path, process: &F) -> Outcome
where
    F: Fn(&Path) -> Outcome,
{
    panic::catch_unwind(AssertUnwindSafe(|| process(path)))
        .unwrap_or_else(|payload| Outcome::failed(path, ReplaceError::Panicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
