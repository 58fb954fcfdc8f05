//! Batch scheduler - fans manifest batches out to a bounded worker pool.
//!
//! The coordinator reads the manifest once, cutting it into batches. Each
//! batch is parsed and validated synchronously on a blocking worker thread;
//! a semaphore caps how many batches are in flight. Results come back over a
//! completion channel and are merged in the order batches finish.

pub mod batch;

use crate::utils::{Result, VerifyError};
use crate::verify::{ContentHasher, Discrepancy, Sha256Hasher, ValidateOptions};
use batch::{process_batch, BatchReport, LineBatcher};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info};

/// Lines per batch unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Upper bound on the default worker count
pub const MAX_DEFAULT_WORKERS: usize = 6;

/// Default pool size: host parallelism, capped at `MAX_DEFAULT_WORKERS`.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKERS)
}

/// Batch size and pool size, both positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    batch_size: usize,
    workers: usize,
}

impl SchedulerOptions {
    pub fn new(batch_size: usize, workers: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(VerifyError::Config("batch size must be at least 1".to_string()));
        }
        if workers == 0 {
            return Err(VerifyError::Config("worker count must be at least 1".to_string()));
        }

        Ok(Self { batch_size, workers })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: default_workers(),
        }
    }
}

/// Outcome of a complete run.
#[derive(Debug, Default)]
pub struct VerificationSummary {
    /// Manifest lines read, comments included
    pub lines: usize,

    /// Records validated
    pub entries: usize,

    pub batches: usize,

    /// Every discrepancy found, in batch completion order
    pub discrepancies: Vec<Discrepancy>,
}

impl VerificationSummary {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    fn merge(&mut self, report: BatchReport) {
        self.batches += 1;
        self.entries += report.entries;
        self.discrepancies.extend(report.discrepancies);
    }
}

/// Runs parser and validator over a manifest across a worker pool.
pub struct BatchScheduler {
    options: SchedulerOptions,
    validate: Arc<ValidateOptions>,
    hasher: Arc<dyn ContentHasher>,
}

impl BatchScheduler {
    /// Create a scheduler that hashes with SHA-256
    pub fn new(options: SchedulerOptions, validate: ValidateOptions) -> Self {
        Self {
            options,
            validate: Arc::new(validate),
            hasher: Arc::new(Sha256Hasher::new()),
        }
    }

    /// Replace the content hasher
    pub fn with_hasher(mut self, hasher: Arc<dyn ContentHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Verify the tree against the manifest at `path`.
    pub async fn verify_file(&self, path: &Path) -> Result<VerificationSummary> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| VerifyError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Verifying against manifest {}", path.display());
        self.run(BufReader::new(file)).await
    }

    /// Verify the tree against a manifest line stream.
    ///
    /// Returns the first structural error any batch hits; no further batches
    /// are submitted after it is seen.
    pub async fn run<R: AsyncBufRead + Unpin>(&self, reader: R) -> Result<VerificationSummary> {
        let semaphore = Arc::new(Semaphore::new(self.options.workers));
        let (tx, mut rx) = mpsc::unbounded_channel::<Result<BatchReport>>();
        let mut batcher = LineBatcher::new(reader, &self.options);
        let mut summary = VerificationSummary::default();
        let mut submitted = 0usize;
        let mut completed = 0usize;

        debug!(
            "Starting batch scheduler (batch_size: {}, workers: {})",
            self.options.batch_size, self.options.workers
        );

        while let Some(batch) = batcher.next_batch().await? {
            // A free permit means a free worker; waiting here also keeps the
            // number of buffered batches bounded.
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| VerifyError::Worker(e.to_string()))?;

            while let Ok(result) = rx.try_recv() {
                completed += 1;
                summary.merge(result?);
            }

            submitted += 1;
            summary.lines += batch.lines.len();
            debug!(
                "Submitting batch {} (lines {}..{})",
                submitted,
                batch.first_line,
                batch.first_line + batch.lines.len() - 1
            );

            let tx = tx.clone();
            let hasher = Arc::clone(&self.hasher);
            let validate = Arc::clone(&self.validate);
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let result = process_batch(&batch, hasher.as_ref(), &validate);
                let _ = tx.send(result);
            });
        }

        // Only worker-held senders remain; the channel closes once they finish
        drop(tx);

        while completed < submitted {
            match rx.recv().await {
                Some(result) => {
                    completed += 1;
                    summary.merge(result?);
                }
                None => {
                    return Err(VerifyError::Worker(format!(
                        "{} of {} batches ended without a result",
                        submitted - completed,
                        submitted
                    )));
                }
            }
        }

        info!(
            "Checked {} entries from {} lines in {} batches, {} discrepancies",
            summary.entries,
            summary.lines,
            summary.batches,
            summary.discrepancies.len()
        );

        Ok(summary)
    }
}
