//! Manifest entry types.
//!
//! One `ManifestEntry` describes one path of the trusted tree: its ownership,
//! permission bits, and a record shape that depends on the entry type.

use std::fmt;
use std::path::PathBuf;

/// Type tag used for directory records.
pub const TYPE_DIR: &str = "dir";

/// Type tag used for symbolic link records.
pub const TYPE_LINK: &str = "link";

/// A single validated manifest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path as written in the manifest, leading marker stripped
    pub path: PathBuf,

    /// Permission bits, octal, exactly as written (e.g. `755`)
    pub mode: String,

    /// Expected owner
    pub uid: u32,

    /// Expected group
    pub gid: u32,

    /// Record shape selected by `type=`
    pub kind: EntryKind,
}

/// Record shape of a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// `type=dir`
    Directory,

    /// `type=link`, target stored verbatim and never resolved
    Link { target: String },

    /// Any other type tag. The tag is kept as written; `size` is recorded but
    /// only the digest is verified.
    File {
        type_tag: String,
        size: u64,
        sha256: String,
    },
}

impl EntryKind {
    /// The `type=` value this record was parsed from.
    pub fn type_tag(&self) -> &str {
        match self {
            EntryKind::Directory => TYPE_DIR,
            EntryKind::Link { .. } => TYPE_LINK,
            EntryKind::File { type_tag, .. } => type_tag,
        }
    }
}

impl ManifestEntry {
    pub fn link_target(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Link { target } => Some(target),
            _ => None,
        }
    }

    pub fn size(&self) -> Option<u64> {
        match &self.kind {
            EntryKind::File { size, .. } => Some(*size),
            _ => None,
        }
    }

    pub fn sha256(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::File { sha256, .. } => Some(sha256),
            _ => None,
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mode={} uid={} gid={} type={}",
            self.path.display(),
            self.mode,
            self.uid,
            self.gid,
            self.kind.type_tag()
        )
    }
}

/// Canonical octal form of a permission string: leading zeros stripped,
/// `"0"` when nothing else remains.
pub fn canonical_mode(mode: &str) -> &str {
    let trimmed = mode.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}
