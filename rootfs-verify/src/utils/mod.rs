//! Utility modules for rootfs-verify.

pub mod errors;
pub mod logger;

pub use errors::{Result, VerifyError};
