//! Error types for rootfs-verify.
//!
//! Discrepancies are not errors: they are collected and reported. An error
//! means the run could not produce a trustworthy result at all.

use crate::manifest::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status for a malformed manifest.
pub const EXIT_STRUCTURAL: u8 = 2;

/// Exit status when the tool itself could not run.
pub const EXIT_INFRASTRUCTURE: u8 = 3;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed manifest line {line_number}: {source}")]
    Parse {
        /// 1-based line number in the manifest
        line_number: usize,
        source: ParseError,
    },

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Cannot write discrepancy log {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl VerifyError {
    /// True when the manifest itself is malformed.
    pub fn is_structural(&self) -> bool {
        matches!(self, VerifyError::Parse { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_structural() {
            EXIT_STRUCTURAL
        } else {
            EXIT_INFRASTRUCTURE
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
