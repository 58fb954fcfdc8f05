//! Validation of manifest entries against the live filesystem.

pub mod discrepancy;
pub mod hasher;
pub mod snapshot;
pub mod validator;

pub use discrepancy::{Discrepancy, DiscrepancyKind};
pub use hasher::{ContentHasher, Sha256Hasher};
pub use snapshot::{FileKind, LiveMetadata};
pub use validator::{check_entry, validate_entry, ValidateOptions};
