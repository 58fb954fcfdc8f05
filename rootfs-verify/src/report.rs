//! Discrepancy log writing and exit status mapping.

use crate::utils::{Result, VerifyError};
use crate::verify::Discrepancy;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Exit status when discrepancies were found.
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Result of a finished verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tree matches the manifest
    Clean,

    /// Discrepancies were written to `log_path`
    Discrepancies { count: usize, log_path: PathBuf },
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Clean => 0,
            Outcome::Discrepancies { .. } => EXIT_DISCREPANCIES,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Clean => write!(f, "No discrepancies found."),
            Outcome::Discrepancies { count, log_path } => write!(
                f,
                "{} discrepancies found. Logged in {}",
                count,
                log_path.display()
            ),
        }
    }
}

/// Persists discrepancies, one per line, to a log file.
#[derive(Debug, Clone)]
pub struct Reporter {
    log_path: PathBuf,
}

impl Reporter {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    /// Write the log if there is anything to report.
    ///
    /// A clean run leaves the log untouched.
    pub fn report(&self, discrepancies: &[Discrepancy]) -> Result<Outcome> {
        if discrepancies.is_empty() {
            return Ok(Outcome::Clean);
        }

        self.write_log(discrepancies)
            .map_err(|source| VerifyError::Report {
                path: self.log_path.clone(),
                source,
            })?;

        info!(
            "Wrote {} discrepancies to {}",
            discrepancies.len(),
            self.log_path.display()
        );

        Ok(Outcome::Discrepancies {
            count: discrepancies.len(),
            log_path: self.log_path.clone(),
        })
    }

    fn write_log(&self, discrepancies: &[Discrepancy]) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(&self.log_path)?);
        for discrepancy in discrepancies {
            writeln!(writer, "{}", discrepancy)?;
        }
        writer.flush()
    }
}
