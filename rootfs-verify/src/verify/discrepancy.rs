//! Discrepancies between the manifest and the live tree.

use super::snapshot::FileKind;
use std::fmt;
use std::path::{Path, PathBuf};

/// One mismatch for one manifest path.
///
/// The `Display` form is the line written to the discrepancy log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    /// Path as written in the manifest
    pub path: PathBuf,

    pub kind: DiscrepancyKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscrepancyKind {
    /// Nothing exists at the path
    Missing,

    /// lstat failed for a reason other than absence
    Inaccessible { reason: String },

    Uid { expected: u32, actual: u32 },

    Gid { expected: u32, actual: u32 },

    FileType { expected: String, actual: FileKind },

    Digest { expected: String, actual: String },

    /// The file could not be opened or read for hashing
    Unreadable { reason: String },

    /// Both sides in canonical octal
    Mode { expected: String, actual: String },

    LinkTarget { expected: String, actual: String },

    /// The entry is a symlink but its target could not be read
    LinkUnreadable { expected: String },
}

impl Discrepancy {
    pub fn new(path: &Path, kind: DiscrepancyKind) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
        }
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.kind)
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscrepancyKind::Missing => write!(f, "file does not exist."),
            DiscrepancyKind::Inaccessible { reason } => write!(f, "cannot inspect: {}", reason),
            DiscrepancyKind::Uid { expected, actual } => {
                write!(f, "got uid {}, expected: {}", actual, expected)
            }
            DiscrepancyKind::Gid { expected, actual } => {
                write!(f, "got gid {}, expected: {}", actual, expected)
            }
            DiscrepancyKind::FileType { expected, actual } => {
                write!(f, "incorrect file type, got {}, expected: {}", actual, expected)
            }
            DiscrepancyKind::Digest { expected, actual } => {
                write!(f, "sha256 mismatch, got: {}, expected: {}", actual, expected)
            }
            DiscrepancyKind::Unreadable { reason } => {
                write!(f, "unable to hash contents: {}", reason)
            }
            DiscrepancyKind::Mode { expected, actual } => {
                write!(f, "got mode {}, expected: {}", actual, expected)
            }
            DiscrepancyKind::LinkTarget { expected, actual } => {
                write!(f, "got link target {:?}, expected: {:?}", actual, expected)
            }
            DiscrepancyKind::LinkUnreadable { expected } => {
                write!(f, "unable to read link target, expected: {:?}", expected)
            }
        }
    }
}
