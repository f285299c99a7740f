//! Tag content rendered into and parsed from the tagged regions of a file.

use crate::error::TagError;
use crate::format::{PrependedHeader, TrailerFields, HEADER_LEN};

/// In-memory tag content managed by a [`TagFile`](crate::TagFile).
///
/// The engine only moves bytes; the content decides what those bytes are.
pub trait TagContent {
    /// Appends the complete prepended tag (header included) to `out`.
    ///
    /// Appending nothing means the file should carry no prepended tag.
    fn render_prepended(&self, out: &mut Vec<u8>) -> Result<(), TagError>;

    /// Appends the appended trailer to `out`.
    ///
    /// Must append exactly [`TRAILER_LEN`](crate::format::TRAILER_LEN) bytes.
    fn render_appended(&self, out: &mut Vec<u8>) -> Result<(), TagError>;

    /// Replaces the content from a prepended tag region, header included.
    fn parse_prepended(&mut self, data: &[u8]) -> Result<(), TagError>;

    /// Replaces the content from a trailer region.
    fn parse_appended(&mut self, data: &[u8]) -> Result<(), TagError>;

    /// Called after the content has been written to disk.
    fn mark_clean(&mut self) {}
}

/// Tag content holding an opaque frame body and trailer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicTag {
    /// Frame data following the prepended header
    pub frames: Vec<u8>,
    /// Major and minor version written into the prepended header
    pub version: (u8, u8),
    pub trailer: TrailerFields,
}

impl Default for BasicTag {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            version: (4, 0),
            trailer: TrailerFields::new(),
        }
    }
}

impl BasicTag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tag whose prepended body is `frames`.
    pub fn with_frames(frames: impl Into<Vec<u8>>) -> Self {
        Self {
            frames: frames.into(),
            ..Self::default()
        }
    }
}

impl TagContent for BasicTag {
    fn render_prepended(&self, out: &mut Vec<u8>) -> Result<(), TagError> {
        if self.frames.is_empty() {
            return Ok(());
        }
        let header = PrependedHeader::new(self.version.0, self.version.1, self.frames.len())?;
        out.extend_from_slice(&header.render());
        out.extend_from_slice(&self.frames);
        Ok(())
    }

    fn render_appended(&self, out: &mut Vec<u8>) -> Result<(), TagError> {
        out.extend_from_slice(&self.trailer.render());
        Ok(())
    }

    fn parse_prepended(&mut self, data: &[u8]) -> Result<(), TagError> {
        let Some(header) = PrependedHeader::parse(data) else {
            self.frames.clear();
            return Ok(());
        };
        let end = (HEADER_LEN + header.size as usize).min(data.len());
        self.version = (header.major, header.minor);
        self.frames = data[HEADER_LEN..end].to_vec();
        Ok(())
    }

    fn parse_appended(&mut self, data: &[u8]) -> Result<(), TagError> {
        self.trailer = TrailerFields::parse(data)?;
        Ok(())
    }

    fn mark_clean(&mut self) {
        self.trailer.mark_clean();
    }
}
