//! Filesystem capabilities used by the tag file engine.
//!
//! The engine never touches `std::fs` directly; it goes through
//! [`FileSystem`] so that it can run against [`MemoryFileSystem`] in tests,
//! including injected write, rename and truncate failures.

mod memory;
mod std_fs;

use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};

pub use memory::{MemoryFile, MemoryFileSystem};
pub use std_fs::StdFileSystem;

/// Permission bits of a file (Unix mode bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(pub u32);

impl FileMode {
    /// Returns `true` if no write bit is set.
    pub fn is_read_only(self) -> bool {
        self.0 & 0o222 == 0
    }
}

/// Filesystem operations needed to read, update and rewrite tagged files.
pub trait FileSystem {
    /// Open file handle.
    type File: Read + Write + Seek;

    /// Opens an existing file for reading.
    fn open_read(&self, path: &Path) -> io::Result<Self::File>;

    /// Opens an existing file for reading and writing without truncating it.
    fn open_read_write(&self, path: &Path) -> io::Result<Self::File>;

    /// Creates a file for reading and writing, truncating any existing one.
    fn create(&self, path: &Path) -> io::Result<Self::File>;

    /// Creates a uniquely named empty file next to `path`.
    ///
    /// The name is `path` plus a dot and a `suffix_len` character unique suffix.
    fn create_temp_beside(
        &self,
        path: &Path,
        suffix_len: usize,
    ) -> io::Result<(PathBuf, Self::File)>;

    /// Returns the size of the file in bytes.
    fn file_size(&self, path: &Path) -> io::Result<u64>;

    /// Shrinks or extends the file to `len` bytes.
    fn truncate(&self, path: &Path, len: u64) -> io::Result<()>;

    /// Deletes the file.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Renames `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Returns the permission bits of the file.
    fn mode(&self, path: &Path) -> io::Result<FileMode>;

    /// Sets the permission bits of the file.
    fn set_mode(&self, path: &Path, mode: FileMode) -> io::Result<()>;

    /// Flushes file contents to durable storage.
    fn sync(&self, file: &mut Self::File) -> io::Result<()>;

    /// Returns `true` if the path names an existing file.
    fn exists(&self, path: &Path) -> bool {
        self.file_size(path).is_ok()
    }
}
