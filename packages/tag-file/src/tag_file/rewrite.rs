//! Full file rewrite through a temporary copy.
//!
//! Used whenever the prepended region changes size: the new payload and the
//! rest of the original file are copied into a temporary file beside the
//! target, which then replaces the original.

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::TagFileConfig;
use crate::error::TagError;
use crate::fs::FileSystem;

use super::io_utils::{classify_io_error, retry_io_operation};

/// Removes the temporary file unless disarmed.
struct TempFileGuard<'a, F: FileSystem> {
    fs: &'a F,
    path: PathBuf,
    armed: bool,
}

impl<'a, F: FileSystem> TempFileGuard<'a, F> {
    fn new(fs: &'a F, path: PathBuf) -> Self {
        Self {
            fs,
            path,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<F: FileSystem> Drop for TempFileGuard<'_, F> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.fs.remove(&self.path) {
                tracing::warn!(
                    "Failed to remove temporary file {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Replaces the first `prepended_bytes` bytes of the file at `path` with
/// `payload`.
///
/// The original is left untouched unless every write to the temporary copy
/// succeeded. Transient I/O failures retry the whole rewrite.
///
/// # Arguments
/// * `fs` - Filesystem holding the file
/// * `path` - File to rewrite
/// * `prepended_bytes` - Size of the region being replaced
/// * `payload` - New region content, possibly empty
/// * `config` - Copy and retry settings
///
/// # Returns
/// The number of payload bytes now at the front of the file.
pub(crate) fn rewrite_file<F: FileSystem>(
    fs: &F,
    path: &Path,
    prepended_bytes: u64,
    payload: &[u8],
    config: &TagFileConfig,
) -> Result<u64, TagError> {
    retry_io_operation(
        || rewrite_file_internal(fs, path, prepended_bytes, payload, config),
        config.max_retries,
        config.retry_delay_ms,
        "rewrite_file",
    )
}

fn rewrite_file_internal<F: FileSystem>(
    fs: &F,
    path: &Path,
    prepended_bytes: u64,
    payload: &[u8],
    config: &TagFileConfig,
) -> Result<u64, TagError> {
    let mut source = fs
        .open_read(path)
        .map_err(|e| classify_io_error(e, "Failed to open file for rewrite"))?;
    let (temp_path, mut temp) = fs
        .create_temp_beside(path, config.temp_suffix_len)
        .map_err(|e| classify_io_error(e, "Failed to create temporary file"))?;
    let mut guard = TempFileGuard::new(fs, temp_path.clone());

    temp.write_all(payload)
        .map_err(|e| classify_io_error(e, "Failed to write tag payload"))?;

    source
        .seek(SeekFrom::Start(prepended_bytes))
        .map_err(|e| classify_io_error(e, "Failed to seek past old tag"))?;
    let mut buf = vec![0u8; config.copy_chunk_size.max(1)];
    let mut copied = 0u64;
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(classify_io_error(e, "Failed to read media data")),
        };
        temp.write_all(&buf[..n])
            .map_err(|e| classify_io_error(e, "Failed to copy media data"))?;
        copied += n as u64;
    }

    temp.flush()
        .map_err(|e| classify_io_error(e, "Failed to flush temporary file"))?;
    if config.sync_on_rewrite {
        fs.sync(&mut temp)
            .map_err(|e| classify_io_error(e, "Failed to sync temporary file"))?;
    }
    drop(temp);
    drop(source);

    let mode = match fs.mode(path) {
        Ok(mode) => Some(mode),
        Err(e) => {
            tracing::warn!("Failed to read permissions of {}: {}", path.display(), e);
            None
        }
    };

    fs.remove(path)
        .map_err(|e| classify_io_error(e, "Failed to remove original file"))?;
    guard.disarm();

    // The original is gone; from here on the rewrite counts as done
    if let Err(e) = fs.rename(&temp_path, path) {
        tracing::error!(
            "Failed to rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        );
        return Ok(payload.len() as u64);
    }

    if config.preserve_permissions {
        if let Some(mode) = mode {
            if let Err(e) = fs.set_mode(path, mode) {
                tracing::warn!("Failed to restore permissions of {}: {}", path.display(), e);
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        payload = payload.len(),
        copied,
        "Rewrote file"
    );
    Ok(payload.len() as u64)
}
