//! Text field model.
//!
//! A [`TextField`] owns one contiguous buffer holding zero or more text
//! items in the field's active encoding. Items are separated by one NUL byte
//! (single-byte encodings) or one 0x0000 code unit (UTF-16); the last item
//! is never terminated inside the buffer. Item boundaries are recovered by
//! scanning, see [`TextField::item_span`].

mod descriptor;
mod parse;
mod text;

pub use descriptor::{FieldDescriptor, FieldFlags, FieldType};

use crate::encoding::{convert, TextEncoding};
use crate::error::FieldError;

/// Location of one item inside the field buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSpan {
    /// Byte offset of the first byte of the item
    pub start: usize,
    /// Item length in bytes, excluding any terminator
    pub len: usize,
}

impl ItemSpan {
    /// Byte offset one past the item.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A text-bearing field of a tag frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    /// Static description of the field layout
    descriptor: FieldDescriptor,
    /// Active encoding of `text`
    encoding: TextEncoding,
    /// All items, separated by encoding-specific terminators
    text: Vec<u8>,
    /// Number of items stored in `text`
    item_count: usize,
    /// Set on mutation, cleared by a successful parse or `mark_clean`
    changed: bool,
}

impl TextField {
    /// Creates an empty field using the descriptor's default encoding.
    ///
    /// Fixed-size fields always use Latin-1 regardless of the default.
    pub fn new(descriptor: FieldDescriptor) -> Self {
        let encoding = if descriptor.is_fixed_size() {
            TextEncoding::Latin1
        } else {
            descriptor.default_encoding
        };
        Self {
            descriptor,
            encoding,
            text: Vec::new(),
            item_count: 0,
            changed: false,
        }
    }

    /// Returns the field descriptor.
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Returns the active encoding.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Returns the number of stored items.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Returns the raw buffer with all items and separators.
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Returns `true` if the field was modified since the last parse or
    /// [`mark_clean`](Self::mark_clean).
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Clears the dirty flag, typically after the field has been rendered
    /// and the result persisted.
    pub fn mark_clean(&mut self) {
        self.changed = false;
    }

    /// Removes all items.
    pub fn clear(&mut self) {
        if !self.text.is_empty() || self.item_count > 0 {
            self.changed = true;
        }
        self.text.clear();
        self.item_count = 0;
    }

    /// Switches the active encoding, transcoding every stored item.
    ///
    /// # Errors
    /// Fixed-size fields only accept Latin-1. Fails without modifying the
    /// field if any item cannot be converted.
    pub fn set_encoding(&mut self, encoding: TextEncoding) -> Result<(), FieldError> {
        self.ensure_text()?;
        if encoding == self.encoding {
            return Ok(());
        }
        if self.descriptor.is_fixed_size() && encoding != TextEncoding::Latin1 {
            return Err(FieldError::FixedSizeViolation { index: 0, encoding });
        }

        let items = self
            .items()
            .map(|item| convert(item, self.encoding, encoding))
            .collect::<Result<Vec<_>, _>>()?;

        self.encoding = encoding;
        self.text = join_items(items.iter().map(Vec::as_slice), encoding);
        self.changed = true;
        Ok(())
    }

    /// Locates item `index` by scanning from the start of the buffer.
    ///
    /// Index 0 is always valid, even on an empty field, in which case an
    /// empty span at offset 0 is returned.
    ///
    /// # Returns
    /// `None` if the field holds no text or `index` is out of range.
    pub fn item_span(&self, index: usize) -> Option<ItemSpan> {
        if !self.descriptor.is_text() || (index > 0 && index >= self.item_count) {
            return None;
        }
        if self.item_count == 0 {
            return Some(ItemSpan { start: 0, len: 0 });
        }

        let width = self.encoding.unit_width();
        let mut start = 0;
        for _ in 0..index {
            start = self.find_terminator(start)? + width;
        }

        // The last item has no terminator
        let end = if index + 1 == self.item_count {
            self.text.len()
        } else {
            self.find_terminator(start).unwrap_or(self.text.len())
        };
        Some(ItemSpan {
            start,
            len: end - start,
        })
    }

    /// Returns the raw bytes of item `index` in the active encoding.
    ///
    /// # Errors
    /// `NotText` for non-text fields, `IndexOutOfRange` for a bad index.
    pub fn raw_item(&self, index: usize) -> Result<&[u8], FieldError> {
        self.ensure_text()?;
        let span = self.item_span(index).ok_or(FieldError::IndexOutOfRange {
            index,
            count: self.item_count,
        })?;
        Ok(&self.text[span.start..span.end()])
    }

    /// Returns the byte length of item `index`, or 0 if it does not exist.
    pub fn raw_item_len(&self, index: usize) -> usize {
        if index >= self.item_count {
            return 0;
        }
        self.item_span(index).map_or(0, |span| span.len)
    }

    /// Iterates over the raw items in order.
    pub fn items(&self) -> Items<'_> {
        Items {
            field: self,
            pos: 0,
            remaining: self.item_count,
        }
    }

    fn find_terminator(&self, from: usize) -> Option<usize> {
        let rest = self.text.get(from..)?;
        if self.encoding.is_single_byte() {
            rest.iter().position(|&b| b == 0).map(|p| from + p)
        } else {
            rest.chunks_exact(2)
                .position(|unit| unit == [0, 0])
                .map(|p| from + p * 2)
        }
    }

    fn ensure_text(&self) -> Result<(), FieldError> {
        if self.descriptor.is_text() {
            Ok(())
        } else {
            Err(FieldError::NotText)
        }
    }
}

/// Iterator over the raw items of a [`TextField`].
#[derive(Debug, Clone)]
pub struct Items<'a> {
    field: &'a TextField,
    pos: usize,
    remaining: usize,
}

impl<'a> Iterator for Items<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let text = &self.field.text;
        let end = if self.remaining == 0 {
            text.len()
        } else {
            self.field.find_terminator(self.pos).unwrap_or(text.len())
        };
        let start = self.pos.min(end);
        self.pos = (end + self.field.encoding.unit_width()).min(text.len());
        Some(&text[start..end])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Items<'_> {}

/// Concatenates items, separating them with the encoding's terminator.
pub(crate) fn join_items<'a, I>(items: I, encoding: TextEncoding) -> Vec<u8>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut out = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(encoding.terminator());
        }
        out.extend_from_slice(item);
    }
    out
}
