//! Manifest batching and the work done for one batch.

use super::SchedulerOptions;
use crate::manifest::parse_line;
use crate::utils::{Result, VerifyError};
use crate::verify::{validate_entry, ContentHasher, Discrepancy, ValidateOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// A contiguous run of manifest lines handled by one worker.
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based line number of `lines[0]`
    pub first_line: usize,

    pub lines: Vec<String>,
}

/// What one batch produced.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records validated (comments and blank lines excluded)
    pub entries: usize,

    /// Per-entry discrepancies, in line order
    pub discrepancies: Vec<Discrepancy>,
}

/// Splits a line stream into batches of at most `batch_size` lines.
pub struct LineBatcher<R> {
    lines: Lines<R>,
    batch_size: usize,
    next_line: usize,
}

impl<R: AsyncBufRead + Unpin> LineBatcher<R> {
    /// Batch size comes from validated `SchedulerOptions`, so it is never zero.
    pub fn new(reader: R, options: &SchedulerOptions) -> Self {
        Self {
            lines: reader.lines(),
            batch_size: options.batch_size(),
            next_line: 1,
        }
    }

    /// Read the next batch; `None` once the stream is exhausted.
    pub async fn next_batch(&mut self) -> std::io::Result<Option<Batch>> {
        let mut lines = Vec::with_capacity(self.batch_size);

        while lines.len() < self.batch_size {
            match self.lines.next_line().await? {
                Some(line) => lines.push(line),
                None => break,
            }
        }

        if lines.is_empty() {
            return Ok(None);
        }

        let batch = Batch {
            first_line: self.next_line,
            lines,
        };
        self.next_line += batch.lines.len();

        Ok(Some(batch))
    }
}

/// Parse and validate every line of a batch, in order.
///
/// The whole batch is parsed before anything is validated, so a malformed
/// line fails the batch without touching the filesystem.
pub fn process_batch(
    batch: &Batch,
    hasher: &dyn ContentHasher,
    options: &ValidateOptions,
) -> Result<BatchReport> {
    let mut entries = Vec::with_capacity(batch.lines.len());

    for (offset, line) in batch.lines.iter().enumerate() {
        let parsed = parse_line(line).map_err(|source| VerifyError::Parse {
            line_number: batch.first_line + offset,
            source,
        })?;

        if let Some(entry) = parsed {
            entries.push(entry);
        }
    }

    let mut report = BatchReport {
        entries: entries.len(),
        discrepancies: Vec::new(),
    };

    for entry in &entries {
        report
            .discrepancies
            .extend(validate_entry(entry, hasher, options));
    }

    Ok(report)
}
