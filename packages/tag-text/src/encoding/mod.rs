//! Pairwise conversion between the tag text encodings.
//!
//! UTF-16 text is held internally as big-endian code units without a byte
//! order mark. Both UTF-16 flavors share that representation and only
//! differ when written to the wire.

mod latin1;
mod utf;

use crate::error::ConversionError;

/// Text encodings a field can be stored in.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TextEncoding {
    /// ISO-8859-1, one byte per character
    #[default]
    Latin1 = 0,
    /// UTF-16 written with a byte order mark
    Utf16 = 1,
    /// UTF-16 big-endian, written without a byte order mark
    Utf16Be = 2,
    /// UTF-8
    Utf8 = 3,
}

impl TextEncoding {
    /// Maps the on-disk encoding byte to an encoding.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Latin1),
            1 => Some(Self::Utf16),
            2 => Some(Self::Utf16Be),
            3 => Some(Self::Utf8),
            _ => None,
        }
    }

    /// Returns `true` if strings are terminated by a single NUL byte.
    ///
    /// UTF-8 counts as single-byte here: terminators and accessors work on
    /// byte units even though characters may span several bytes.
    pub const fn is_single_byte(self) -> bool {
        matches!(self, Self::Latin1 | Self::Utf8)
    }

    /// Returns `true` if the encoding uses 16-bit code units.
    pub const fn is_double_byte(self) -> bool {
        !self.is_single_byte()
    }

    /// Width of one code unit in bytes.
    pub const fn unit_width(self) -> usize {
        if self.is_single_byte() {
            1
        } else {
            2
        }
    }

    /// Terminator written after a string in this encoding.
    pub const fn terminator(self) -> &'static [u8] {
        if self.is_single_byte() {
            &[0]
        } else {
            &[0, 0]
        }
    }

    fn family(self) -> Family {
        match self {
            Self::Latin1 => Family::Latin1,
            Self::Utf8 => Family::Utf8,
            Self::Utf16 | Self::Utf16Be => Family::Utf16,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Family {
    Latin1,
    Utf8,
    Utf16,
}

/// NUL, TAB, LF, CR and everything from space upwards are legal in tag text.
#[inline]
pub(crate) fn is_legal_tag_char(c: u8) -> bool {
    c == 0 || c >= 0x20 || c == 0x09 || c == 0x0a || c == 0x0d
}

/// Replaces control characters that may not appear in tag text with `?`.
#[inline]
pub(crate) fn sanitize(c: u8) -> u8 {
    if is_legal_tag_char(c) { c } else { b'?' }
}

/// Converts `data` from `source` to `target` encoding.
///
/// Returns the input unchanged when both encodings are the same (both UTF-16
/// flavors count as the same) or when the input is empty. Conversions out of
/// or into Latin-1 replace illegal control characters with `?`; UTF-8 to
/// Latin-1 is a lossy narrowing that is only meaningful for the Latin-1
/// subset of Unicode.
///
/// # Errors
/// UTF-8/UTF-16 transcoding is strict: any malformed sequence fails the
/// whole conversion. UTF-16 input must have an even byte length.
pub fn convert(
    data: &[u8],
    source: TextEncoding,
    target: TextEncoding,
) -> Result<Vec<u8>, ConversionError> {
    if data.is_empty() || source.family() == target.family() {
        return Ok(data.to_vec());
    }

    match (source.family(), target.family()) {
        (Family::Latin1, Family::Utf8) => Ok(latin1::to_utf8(data)),
        (Family::Latin1, Family::Utf16) => Ok(latin1::to_utf16(data)),
        (Family::Utf8, Family::Latin1) => Ok(latin1::from_utf8(data)),
        (Family::Utf16, Family::Latin1) => latin1::from_utf16(data),
        (Family::Utf8, Family::Utf16) => utf::utf8_to_utf16(data, source, target),
        (Family::Utf16, Family::Utf8) => utf::utf16_to_utf8(data, source, target),
        // Same family handled above
        _ => Ok(data.to_vec()),
    }
}
