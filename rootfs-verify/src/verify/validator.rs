//! Per-entry validation.
//!
//! Every check runs independently and appends its own discrepancy, so one
//! entry can report a wrong owner, a wrong mode and a wrong digest at once.
//! Only a path that cannot be inspected at all stops further checks.

use super::discrepancy::{Discrepancy, DiscrepancyKind};
use super::hasher::ContentHasher;
use super::snapshot::{FileKind, LiveMetadata};
use crate::manifest::entry::canonical_mode;
use crate::manifest::{EntryKind, ManifestEntry};
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Options shared by every validation in a run.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Prefix joined to every manifest path (verifying a mounted image)
    pub root: Option<PathBuf>,

    /// Compare symlink targets against `link=`
    pub check_link_targets: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            root: None,
            check_link_targets: true,
        }
    }
}

impl ValidateOptions {
    /// Location on disk of a manifest path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path.strip_prefix("/").unwrap_or(path)),
            None => path.to_path_buf(),
        }
    }
}

/// Validate one entry against the live filesystem.
pub fn validate_entry(
    entry: &ManifestEntry,
    hasher: &dyn ContentHasher,
    options: &ValidateOptions,
) -> Vec<Discrepancy> {
    let location = options.resolve(&entry.path);
    trace!("Validating {} at {}", entry, location.display());

    let live = match LiveMetadata::lstat(&location) {
        Ok(live) => live,
        Err(e) if is_missing(&e) => {
            return vec![Discrepancy::new(&entry.path, DiscrepancyKind::Missing)];
        }
        Err(e) => {
            return vec![Discrepancy::new(
                &entry.path,
                DiscrepancyKind::Inaccessible {
                    reason: e.to_string(),
                },
            )];
        }
    };

    check_entry(entry, &location, &live, hasher, options.check_link_targets)
}

/// Compare an entry with a metadata snapshot taken at `location`.
///
/// The hasher is the only part that touches the filesystem, which keeps this
/// testable with a synthetic snapshot.
pub fn check_entry(
    entry: &ManifestEntry,
    location: &Path,
    live: &LiveMetadata,
    hasher: &dyn ContentHasher,
    check_link_targets: bool,
) -> Vec<Discrepancy> {
    let mut found = Vec::new();
    let mut report = |kind| found.push(Discrepancy::new(&entry.path, kind));

    if live.uid != entry.uid {
        report(DiscrepancyKind::Uid {
            expected: entry.uid,
            actual: live.uid,
        });
    }

    if live.gid != entry.gid {
        report(DiscrepancyKind::Gid {
            expected: entry.gid,
            actual: live.gid,
        });
    }

    let expected_kind = match &entry.kind {
        EntryKind::Directory => FileKind::Directory,
        EntryKind::Link { .. } => FileKind::Symlink,
        EntryKind::File { .. } => FileKind::Regular,
    };
    if live.kind != expected_kind {
        report(DiscrepancyKind::FileType {
            expected: entry.kind.type_tag().to_string(),
            actual: live.kind,
        });
    }

    match &entry.kind {
        EntryKind::Directory => {}
        EntryKind::Link { target } => {
            if check_link_targets && live.kind == FileKind::Symlink {
                match &live.link_target {
                    Some(actual) if actual.as_os_str() != OsStr::new(target) => {
                        report(DiscrepancyKind::LinkTarget {
                            expected: target.clone(),
                            actual: actual.to_string_lossy().into_owned(),
                        });
                    }
                    Some(_) => {}
                    None => report(DiscrepancyKind::LinkUnreadable {
                        expected: target.clone(),
                    }),
                }
            }
        }
        // Hashed even when the type check failed
        EntryKind::File { sha256, .. } => match hasher.digest(location) {
            Ok(actual) if actual == *sha256 => {}
            Ok(actual) => report(DiscrepancyKind::Digest {
                expected: sha256.clone(),
                actual,
            }),
            Err(e) => report(DiscrepancyKind::Unreadable {
                reason: e.to_string(),
            }),
        },
    }

    let actual_mode = live.octal_permissions();
    let expected_mode = canonical_mode(&entry.mode);
    if actual_mode != expected_mode {
        report(DiscrepancyKind::Mode {
            expected: expected_mode.to_string(),
            actual: actual_mode,
        });
    }

    found
}

/// lstat errors that mean "nothing is there".
fn is_missing(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound || e.raw_os_error() == Some(libc::ENOTDIR)
}
