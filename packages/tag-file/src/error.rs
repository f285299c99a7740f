//! Tag persistence error types.

use tag_text::FieldError;
use thiserror::Error;

/// Tag file operation errors.
#[derive(Error, Debug, Clone)]
pub enum TagError {
    /// Target file does not exist
    #[error("File not found: {0}")]
    NoFile(String),

    /// Target file cannot be opened for writing
    #[error("File is read-only: {0}")]
    ReadOnly(String),

    /// Disk full while writing
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// Other I/O failure
    #[error("I/O error: {0}")]
    IoError(String),

    /// I/O failure that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),

    /// Operation needs a file but the tag is bound to a stream
    #[error("Tag is not linked to a file")]
    NotLinked,

    /// Rendered trailer does not have the fixed trailer length
    #[error("Appended tag must be {expected} bytes, got {got}")]
    InvalidTrailer { expected: usize, got: usize },

    /// Prepended tag body too large for its header size field
    #[error("Prepended tag body of {size} bytes exceeds the header limit")]
    PayloadTooLarge { size: usize },

    /// Configuration rejected by validation or parsing
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Text field failure while building or parsing tag content
    #[error("Field error: {0}")]
    Field(#[from] FieldError),
}
