//! 10-byte prepended tag header.
//!
//! Layout: `"ID3"`, major version, minor version, flags, and the size of the
//! tag body as four syncsafe bytes (7 significant bits each). The size
//! excludes the header itself and the optional 10-byte footer.

use crate::error::TagError;

/// Length of the header (and of the optional footer).
pub const HEADER_LEN: usize = 10;

/// Flag bit announcing a footer after the tag body.
pub const FOOTER_FLAG: u8 = 0x10;

/// Largest body size a syncsafe size field can hold.
pub const MAX_PAYLOAD_SIZE: usize = (1 << 28) - 1;

const HEADER_MAGIC: &[u8; 3] = b"ID3";

/// Decoded prepended tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrependedHeader {
    pub major: u8,
    pub minor: u8,
    pub flags: u8,
    /// Body size, excluding header and footer
    pub size: u32,
}

impl PrependedHeader {
    /// Creates a header for a body of `size` bytes.
    ///
    /// # Errors
    /// `PayloadTooLarge` if `size` does not fit in 28 bits.
    pub fn new(major: u8, minor: u8, size: usize) -> Result<Self, TagError> {
        if size > MAX_PAYLOAD_SIZE {
            return Err(TagError::PayloadTooLarge { size });
        }
        Ok(Self {
            major,
            minor,
            flags: 0,
            size: size as u32,
        })
    }

    /// Decodes a header from the first [`HEADER_LEN`] bytes of `data`.
    ///
    /// Returns `None` if `data` is too short or does not start with a valid
    /// header.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let bytes = data.get(..HEADER_LEN)?;
        if &bytes[..3] != HEADER_MAGIC || bytes[3] == 0xff || bytes[4] == 0xff {
            return None;
        }
        if bytes[6..10].iter().any(|b| b & 0x80 != 0) {
            return None;
        }

        let size = bytes[6..10]
            .iter()
            .fold(0u32, |acc, &b| (acc << 7) | u32::from(b));
        Some(Self {
            major: bytes[3],
            minor: bytes[4],
            flags: bytes[5],
            size,
        })
    }

    /// Returns `true` if a footer follows the body.
    pub fn has_footer(&self) -> bool {
        self.flags & FOOTER_FLAG != 0
    }

    /// Total bytes the tag occupies at the front of the file.
    pub fn total_size(&self) -> u64 {
        let footer = if self.has_footer() { HEADER_LEN } else { 0 };
        (HEADER_LEN + footer) as u64 + u64::from(self.size)
    }

    /// Encodes the header.
    pub fn render(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..3].copy_from_slice(HEADER_MAGIC);
        out[3] = self.major;
        out[4] = self.minor;
        out[5] = self.flags;
        for (i, byte) in out[6..].iter_mut().enumerate() {
            *byte = ((self.size >> (7 * (3 - i))) & 0x7f) as u8;
        }
        out
    }
}
