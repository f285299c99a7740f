//! Fixed 128-byte trailer stored at the end of a file.
//!
//! ```text
//! offset  len  field
//!      0    3  "TAG"
//!      3   30  title
//!     33   30  artist
//!     63   30  album
//!     93    4  year
//!     97   30  comment (28 bytes + NUL + track number when a track is set)
//!    127    1  genre
//! ```

use tag_text::{FieldDescriptor, FieldError, SliceReader, TagReader, TextEncoding, TextField};

use crate::error::TagError;

/// Length of the trailer in bytes.
pub const TRAILER_LEN: usize = 128;

/// Marker at the start of every trailer.
pub const TRAILER_MARKER: &[u8; 3] = b"TAG";

const TITLE_LEN: usize = 30;
const YEAR_LEN: usize = 4;
const COMMENT_LEN: usize = 30;
const SHORT_COMMENT_LEN: usize = 28;

/// Returns `true` if `data` starts with the trailer marker.
pub fn has_trailer_marker(data: &[u8]) -> bool {
    data.starts_with(TRAILER_MARKER)
}

/// Decoded trailer content.
///
/// Text fields are fixed-size Latin-1 fields; getters strip the NUL and
/// space padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerFields {
    title: TextField,
    artist: TextField,
    album: TextField,
    year: TextField,
    comment: TextField,
    track: Option<u8>,
    genre: u8,
    changed: bool,
}

impl Default for TrailerFields {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailerFields {
    /// Creates an empty trailer with genre 255 ("none").
    pub fn new() -> Self {
        Self {
            title: TextField::new(FieldDescriptor::fixed(TITLE_LEN)),
            artist: TextField::new(FieldDescriptor::fixed(TITLE_LEN)),
            album: TextField::new(FieldDescriptor::fixed(TITLE_LEN)),
            year: TextField::new(FieldDescriptor::fixed(YEAR_LEN)),
            comment: TextField::new(FieldDescriptor::fixed(COMMENT_LEN)),
            track: None,
            genre: 0xff,
            changed: false,
        }
    }

    /// Decodes a trailer.
    ///
    /// # Errors
    /// `InvalidTrailer` if `data` is not exactly [`TRAILER_LEN`] bytes or
    /// lacks the marker.
    pub fn parse(data: &[u8]) -> Result<Self, TagError> {
        if data.len() != TRAILER_LEN || !has_trailer_marker(data) {
            return Err(TagError::InvalidTrailer {
                expected: TRAILER_LEN,
                got: data.len(),
            });
        }

        let mut fields = Self::new();
        let mut reader = SliceReader::new(&data[TRAILER_MARKER.len()..TRAILER_LEN - 1]);
        fields.title.parse_text(&mut reader)?;
        fields.artist.parse_text(&mut reader)?;
        fields.album.parse_text(&mut reader)?;
        fields.year.parse_text(&mut reader)?;

        let comment_start = reader.current() as usize + TRAILER_MARKER.len();
        if data[comment_start + SHORT_COMMENT_LEN] == 0
            && data[comment_start + SHORT_COMMENT_LEN + 1] != 0
        {
            let short = &data[comment_start..comment_start + SHORT_COMMENT_LEN];
            fields.comment.set(short, TextEncoding::Latin1)?;
            fields.comment.mark_clean();
            fields.track = Some(data[comment_start + SHORT_COMMENT_LEN + 1]);
        } else {
            fields.comment.parse_text(&mut reader)?;
        }
        fields.genre = data[TRAILER_LEN - 1];

        tracing::trace!(track = ?fields.track, genre = fields.genre, "Parsed trailer");
        Ok(fields)
    }

    /// Encodes the trailer.
    pub fn render(&self) -> [u8; TRAILER_LEN] {
        let mut out = [0u8; TRAILER_LEN];
        out[..TRAILER_MARKER.len()].copy_from_slice(TRAILER_MARKER);
        let mut pos = TRAILER_MARKER.len();
        for field in [&self.title, &self.artist, &self.album, &self.year] {
            let bytes = field.to_bytes();
            out[pos..pos + bytes.len()].copy_from_slice(&bytes);
            pos += bytes.len();
        }

        let comment = self.comment.to_bytes();
        match self.track {
            Some(track) => {
                out[pos..pos + SHORT_COMMENT_LEN].copy_from_slice(&comment[..SHORT_COMMENT_LEN]);
                out[pos + SHORT_COMMENT_LEN] = 0;
                out[pos + SHORT_COMMENT_LEN + 1] = track;
            }
            None => out[pos..pos + COMMENT_LEN].copy_from_slice(&comment),
        }
        out[TRAILER_LEN - 1] = self.genre;
        out
    }

    pub fn title(&self) -> String {
        padded_string(&self.title)
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), FieldError> {
        self.title.set_str(title).map(|_| ())
    }

    pub fn artist(&self) -> String {
        padded_string(&self.artist)
    }

    pub fn set_artist(&mut self, artist: &str) -> Result<(), FieldError> {
        self.artist.set_str(artist).map(|_| ())
    }

    pub fn album(&self) -> String {
        padded_string(&self.album)
    }

    pub fn set_album(&mut self, album: &str) -> Result<(), FieldError> {
        self.album.set_str(album).map(|_| ())
    }

    pub fn year(&self) -> String {
        padded_string(&self.year)
    }

    pub fn set_year(&mut self, year: &str) -> Result<(), FieldError> {
        self.year.set_str(year).map(|_| ())
    }

    pub fn comment(&self) -> String {
        padded_string(&self.comment)
    }

    /// Sets the comment. Only the first 28 bytes survive rendering while a
    /// track number is set.
    pub fn set_comment(&mut self, comment: &str) -> Result<(), FieldError> {
        self.comment.set_str(comment).map(|_| ())
    }

    pub fn track(&self) -> Option<u8> {
        self.track
    }

    /// Sets the track number; `None` or `Some(0)` removes it.
    pub fn set_track(&mut self, track: Option<u8>) {
        self.track = track.filter(|&t| t != 0);
        self.changed = true;
    }

    pub fn genre(&self) -> u8 {
        self.genre
    }

    pub fn set_genre(&mut self, genre: u8) {
        self.genre = genre;
        self.changed = true;
    }

    /// Returns `true` if anything changed since parsing or the last
    /// [`mark_clean`](Self::mark_clean).
    pub fn has_changed(&self) -> bool {
        self.changed
            || self.title.has_changed()
            || self.artist.has_changed()
            || self.album.has_changed()
            || self.year.has_changed()
            || self.comment.has_changed()
    }

    pub fn mark_clean(&mut self) {
        self.changed = false;
        self.title.mark_clean();
        self.artist.mark_clean();
        self.album.mark_clean();
        self.year.mark_clean();
        self.comment.mark_clean();
    }
}

fn padded_string(field: &TextField) -> String {
    field
        .get_string(0)
        .map(|s| s.trim_end_matches(['\0', ' ']).to_string())
        .unwrap_or_default()
}
