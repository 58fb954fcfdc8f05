//! Live filesystem metadata captured without following symlinks.

use std::fmt;
use std::fs;
use std::io;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Path, PathBuf};

/// File type of a live filesystem entry, named as mtree names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Regular,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
}

impl FileKind {
    fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            FileKind::Directory
        } else if file_type.is_symlink() {
            FileKind::Symlink
        } else if file_type.is_block_device() {
            FileKind::BlockDevice
        } else if file_type.is_char_device() {
            FileKind::CharDevice
        } else if file_type.is_fifo() {
            FileKind::Fifo
        } else if file_type.is_socket() {
            FileKind::Socket
        } else {
            FileKind::Regular
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Directory => "dir",
            FileKind::Regular => "file",
            FileKind::Symlink => "link",
            FileKind::BlockDevice => "block",
            FileKind::CharDevice => "char",
            FileKind::Fifo => "fifo",
            FileKind::Socket => "socket",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the metadata validation compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMetadata {
    pub uid: u32,
    pub gid: u32,

    /// Raw `st_mode`, type bits included
    pub mode: u32,

    pub kind: FileKind,

    /// Target of a symlink; `None` for other kinds or when it cannot be read
    pub link_target: Option<PathBuf>,
}

impl LiveMetadata {
    /// lstat `path` and read its link target if it is a symlink.
    ///
    /// Only the lstat can fail; an unreadable link target is left as `None`
    /// so ownership and mode are still checked.
    pub fn lstat(path: &Path) -> io::Result<Self> {
        let metadata = fs::symlink_metadata(path)?;
        let kind = FileKind::from_file_type(metadata.file_type());

        let link_target = match kind {
            FileKind::Symlink => fs::read_link(path).ok(),
            _ => None,
        };

        Ok(Self {
            uid: metadata.uid(),
            gid: metadata.gid(),
            mode: metadata.mode(),
            kind,
            link_target,
        })
    }

    /// Permission portion of the mode (`S_IMODE`).
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }

    /// Permission bits as minimal octal, no prefix (`644`, `4755`, `0`).
    pub fn octal_permissions(&self) -> String {
        format!("{:o}", self.permissions())
    }
}
