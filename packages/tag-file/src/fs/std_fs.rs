//! Filesystem backed by `std::fs`.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::{FileMode, FileSystem};

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    type File = File;

    fn open_read(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }

    fn open_read_write(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open(path)
    }

    fn create(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    }

    fn create_temp_beside(&self, path: &Path, suffix_len: usize) -> io::Result<(PathBuf, File)> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })?;
        let mut prefix = OsString::from(name);
        prefix.push(".");

        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .rand_bytes(suffix_len)
            .tempfile_in(dir)?;
        let (file, temp_path) = temp.keep().map_err(|e| e.error)?;
        Ok((temp_path, file))
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn truncate(&self, path: &Path, len: u64) -> io::Result<()> {
        OpenOptions::new().write(true).open(path)?.set_len(len)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    #[cfg(unix)]
    fn mode(&self, path: &Path) -> io::Result<FileMode> {
        use std::os::unix::fs::PermissionsExt;
        Ok(FileMode(fs::metadata(path)?.permissions().mode()))
    }

    #[cfg(not(unix))]
    fn mode(&self, path: &Path) -> io::Result<FileMode> {
        let read_only = fs::metadata(path)?.permissions().readonly();
        Ok(FileMode(if read_only { 0o444 } else { 0o644 }))
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: FileMode) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode.0))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, path: &Path, mode: FileMode) -> io::Result<()> {
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_readonly(mode.is_read_only());
        fs::set_permissions(path, permissions)
    }

    fn sync(&self, file: &mut File) -> io::Result<()> {
        file.sync_all()
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
