//! In-memory filesystem with fault injection.

use std::collections::HashMap;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{FileMode, FileSystem};

#[derive(Debug)]
struct MemoryEntry {
    data: Arc<Mutex<Vec<u8>>>,
    mode: u32,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<PathBuf, MemoryEntry>,
    temp_counter: u64,
    /// Bytes that may still be written before writes fail with `StorageFull`
    write_budget: Option<u64>,
    fail_rename: bool,
    fail_truncate: bool,
}

/// Filesystem kept entirely in memory.
///
/// Clones share the same files. Files whose mode has no write bit refuse to
/// be opened for writing, which makes read-only targets testable regardless
/// of the privileges of the test process.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces a file with the given contents and mode 0o644.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.state.lock().files.insert(
            path.into(),
            MemoryEntry {
                data: Arc::new(Mutex::new(contents.into())),
                mode: 0o644,
            },
        );
    }

    /// Returns a copy of the file contents.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.state.lock();
        let entry = state.files.get(path.as_ref())?;
        let data = entry.data.lock().clone();
        Some(data)
    }

    /// Returns all file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.state.lock().files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Limits how many more bytes can be written; `None` removes the limit.
    pub fn set_write_budget(&self, budget: Option<u64>) {
        self.state.lock().write_budget = budget;
    }

    /// Makes every rename fail.
    pub fn set_fail_rename(&self, fail: bool) {
        self.state.lock().fail_rename = fail;
    }

    /// Makes every truncate fail.
    pub fn set_fail_truncate(&self, fail: bool) {
        self.state.lock().fail_truncate = fail;
    }

    fn open(&self, path: &Path, writable: bool) -> io::Result<MemoryFile> {
        let state = self.state.lock();
        let entry = state.files.get(path).ok_or_else(|| not_found(path))?;
        if writable && FileMode(entry.mode).is_read_only() {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        Ok(MemoryFile {
            data: Arc::clone(&entry.data),
            pos: 0,
            writable,
            fs: Arc::clone(&self.state),
        })
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(ErrorKind::NotFound, format!("{} not found", path.display()))
}

impl FileSystem for MemoryFileSystem {
    type File = MemoryFile;

    fn open_read(&self, path: &Path) -> io::Result<MemoryFile> {
        self.open(path, false)
    }

    fn open_read_write(&self, path: &Path) -> io::Result<MemoryFile> {
        self.open(path, true)
    }

    fn create(&self, path: &Path) -> io::Result<MemoryFile> {
        {
            let mut state = self.state.lock();
            let entry = state
                .files
                .entry(path.to_path_buf())
                .or_insert_with(|| MemoryEntry {
                    data: Arc::new(Mutex::new(Vec::new())),
                    mode: 0o644,
                });
            if FileMode(entry.mode).is_read_only() {
                return Err(io::Error::new(
                    ErrorKind::PermissionDenied,
                    format!("{} is read-only", path.display()),
                ));
            }
            entry.data.lock().clear();
        }
        self.open(path, true)
    }

    fn create_temp_beside(
        &self,
        path: &Path,
        suffix_len: usize,
    ) -> io::Result<(PathBuf, MemoryFile)> {
        let temp_path = {
            let mut state = self.state.lock();
            loop {
                state.temp_counter += 1;
                let suffix = format!("{:0width$}", state.temp_counter, width = suffix_len);
                let mut name = path.as_os_str().to_os_string();
                name.push(".");
                name.push(suffix);
                let candidate = PathBuf::from(name);
                if !state.files.contains_key(&candidate) {
                    state.files.insert(
                        candidate.clone(),
                        MemoryEntry {
                            data: Arc::new(Mutex::new(Vec::new())),
                            mode: 0o600,
                        },
                    );
                    break candidate;
                }
            }
        };
        let file = self.open(&temp_path, true)?;
        Ok((temp_path, file))
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        let state = self.state.lock();
        let entry = state.files.get(path).ok_or_else(|| not_found(path))?;
        let len = entry.data.lock().len() as u64;
        Ok(len)
    }

    fn truncate(&self, path: &Path, len: u64) -> io::Result<()> {
        let state = self.state.lock();
        if state.fail_truncate {
            return Err(io::Error::other("injected truncate failure"));
        }
        let entry = state.files.get(path).ok_or_else(|| not_found(path))?;
        let len = usize::try_from(len).map_err(|_| io::Error::from(ErrorKind::InvalidInput))?;
        entry.data.lock().resize(len, 0);
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.state
            .lock()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.state.lock();
        if state.fail_rename {
            return Err(io::Error::other("injected rename failure"));
        }
        let entry = state.files.remove(from).ok_or_else(|| not_found(from))?;
        state.files.insert(to.to_path_buf(), entry);
        Ok(())
    }

    fn mode(&self, path: &Path) -> io::Result<FileMode> {
        let state = self.state.lock();
        let entry = state.files.get(path).ok_or_else(|| not_found(path))?;
        Ok(FileMode(entry.mode))
    }

    fn set_mode(&self, path: &Path, mode: FileMode) -> io::Result<()> {
        let mut state = self.state.lock();
        let entry = state.files.get_mut(path).ok_or_else(|| not_found(path))?;
        entry.mode = mode.0;
        Ok(())
    }

    fn sync(&self, _file: &mut MemoryFile) -> io::Result<()> {
        Ok(())
    }
}

/// Open handle to a [`MemoryFileSystem`] file.
#[derive(Debug)]
pub struct MemoryFile {
    data: Arc<Mutex<Vec<u8>>>,
    pos: u64,
    writable: bool,
    fs: Arc<Mutex<MemoryState>>,
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.lock();
        let start = usize::try_from(self.pos).unwrap_or(usize::MAX).min(data.len());
        let n = (data.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                "file opened read-only",
            ));
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let allowed = {
            let mut state = self.fs.lock();
            match state.write_budget.as_mut() {
                Some(0) => return Err(io::Error::from(ErrorKind::StorageFull)),
                Some(budget) => {
                    let allowed = (*budget).min(buf.len() as u64) as usize;
                    *budget -= allowed as u64;
                    allowed
                }
                None => buf.len(),
            }
        };

        let mut data = self.data.lock();
        let start = usize::try_from(self.pos)
            .map_err(|_| io::Error::from(ErrorKind::InvalidInput))?;
        let end = start + allowed;
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(&buf[..allowed]);
        self.pos = end as u64;
        Ok(allowed)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.data.lock().len() as i128;
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(offset) => len + i128::from(offset),
            SeekFrom::Current(offset) => i128::from(self.pos) + i128::from(offset),
        };
        if target < 0 {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "seek before start of file",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}
