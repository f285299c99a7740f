//! I/O utilities for tag file operations.

use std::io::ErrorKind;

use crate::error::TagError;

/// Classifies I/O errors into specific TagError variants.
pub fn classify_io_error(error: std::io::Error, context: &str) -> TagError {
    match error.kind() {
        ErrorKind::NotFound => TagError::NoFile(format!("{}: {}", context, error)),
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => {
            TagError::ReadOnly(format!("{}: {}", context, error))
        }
        ErrorKind::StorageFull | ErrorKind::OutOfMemory => {
            TagError::DiskFull(format!("{}: {}", context, error))
        }
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => {
            TagError::TransientIoError(format!("{}: {}", context, error))
        }
        _ => TagError::IoError(format!("{}: {}", context, error)),
    }
}

/// Runs a whole file operation, starting it over after transient I/O errors.
///
/// The operation must leave the target untouched when it fails, so a fresh
/// attempt starts from the same on-disk state. Errors other than
/// `TransientIoError` are returned immediately.
///
/// # Arguments
/// * `operation` - The complete operation to run
/// * `max_retries` - Attempts allowed after the first one
/// * `retry_delay_ms` - Pause before each new attempt
/// * `context` - Operation name for log messages
pub fn retry_io_operation<F, T>(
    mut operation: F,
    max_retries: u32,
    retry_delay_ms: u64,
    context: &str,
) -> Result<T, TagError>
where
    F: FnMut() -> Result<T, TagError>,
{
    let mut retries_left = max_retries;
    loop {
        let err = match operation() {
            Ok(result) => return Ok(result),
            Err(err @ TagError::TransientIoError(_)) if retries_left > 0 => err,
            Err(err) => return Err(err),
        };

        retries_left -= 1;
        tracing::warn!(
            "{} hit a transient I/O error, restarting it from scratch ({} of {} retries left): {}",
            context,
            retries_left,
            max_retries,
            err
        );
        if retry_delay_ms > 0 {
            std::thread::sleep(std::time::Duration::from_millis(retry_delay_ms));
        }
    }
}
