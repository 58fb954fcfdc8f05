//! Content digests for regular files.

use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Default read size when streaming a file through the digest (64KB)
const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Computes the content digest recorded in the manifest's `sha256=` field.
pub trait ContentHasher: Send + Sync {
    /// Lowercase hex digest of the file at `path`.
    fn digest(&self, path: &Path) -> io::Result<String>;
}

/// Streaming SHA-256 over a file's raw bytes.
#[derive(Debug, Clone)]
pub struct Sha256Hasher {
    buffer_size: usize,
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher for Sha256Hasher {
    fn digest(&self, path: &Path) -> io::Result<String> {
        let file = open_regular(path)?;
        sha256_reader(file, self.buffer_size)
    }
}

/// Open `path` for hashing.
///
/// Symlinks are not followed and FIFOs do not block the open; anything that
/// turns out not to be a regular file is refused before a byte is read.
fn open_regular(path: &Path) -> io::Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NOFOLLOW | libc::O_NONBLOCK)
        .open(path)?;

    if !file.metadata()?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }

    Ok(file)
}

/// Hash everything `reader` yields and return the lowercase hex digest.
pub fn sha256_reader<R: Read>(mut reader: R, buffer_size: usize) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
