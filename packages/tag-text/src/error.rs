//! Text codec error types.

use thiserror::Error;

use crate::encoding::TextEncoding;

/// Failure of an encoding conversion.
///
/// The conversion never produces partial output: either the whole input
/// converts or one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Input is not a well-formed sequence in the source encoding
    #[error("Malformed {from:?} input while converting to {to:?}")]
    Malformed {
        from: TextEncoding,
        to: TextEncoding,
    },

    /// UTF-16 input with a byte length that is not a multiple of two
    #[error("UTF-16 input has odd byte length {len}")]
    OddLength { len: usize },
}

/// Precondition failures of text field operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Text operation on a field that does not hold text
    #[error("Field is not a text field")]
    NotText,

    /// Item index past the end of the item list
    #[error("Item index {index} out of range (item count: {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Fixed-size fields hold a single Latin-1 item
    #[error("Fixed-size field cannot store item {index} in {encoding:?}")]
    FixedSizeViolation {
        index: usize,
        encoding: TextEncoding,
    },

    /// Accessor character width does not match the field encoding
    #[error("Accessor width does not match field encoding {encoding:?}")]
    WidthMismatch { encoding: TextEncoding },

    /// Transcoding of the item failed
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}
