//! rootfs-verify library
//!
//! Verifies an on-disk tree against a trusted mtree manifest: ownership,
//! permission bits, entry type and, for regular files, SHA-256 content.

pub mod config;
pub mod manifest;
pub mod report;
pub mod scheduler;
pub mod utils;
pub mod verify;

// Re-export commonly used types
pub use config::Config;
pub use manifest::{parse_line, EntryKind, ManifestEntry, ParseError};
pub use report::{Outcome, Reporter};
pub use scheduler::{BatchScheduler, SchedulerOptions, VerificationSummary};
pub use utils::errors::VerifyError;
pub use verify::{Discrepancy, DiscrepancyKind};
pub type Result<T> = std::result::Result<T, VerifyError>;
