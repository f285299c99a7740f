//! Setting and getting text items.

use crate::encoding::{convert, TextEncoding};
use crate::error::{ConversionError, FieldError};

use super::{join_items, TextField};

impl TextField {
    /// Replaces the whole field with `text` as its only item.
    ///
    /// # Arguments
    /// * `text` - Item content in `encoding`
    /// * `encoding` - Encoding of `text`
    ///
    /// # Returns
    /// The stored item length in bytes.
    pub fn set(&mut self, text: &[u8], encoding: TextEncoding) -> Result<usize, FieldError> {
        self.ensure_text()?;
        self.clear();
        self.set_text(text, 0, encoding)
    }

    /// Replaces the whole field with a UTF-8 string.
    pub fn set_str(&mut self, text: &str) -> Result<usize, FieldError> {
        self.set(text.as_bytes(), TextEncoding::Utf8)
    }

    /// Appends `text` as a new trailing item.
    pub fn add(&mut self, text: &[u8], encoding: TextEncoding) -> Result<usize, FieldError> {
        self.set_text(text, self.item_count, encoding)
    }

    /// Appends a UTF-8 string as a new trailing item.
    pub fn add_str(&mut self, text: &str) -> Result<usize, FieldError> {
        self.add(text.as_bytes(), TextEncoding::Utf8)
    }

    /// Stores `data` at item `index`.
    ///
    /// `index == item_count()` appends a new item; a smaller index replaces
    /// the existing item. The buffer is rebuilt either way.
    ///
    /// # Arguments
    /// * `data` - Item content in `source` encoding
    /// * `index` - Target item index
    /// * `source` - Encoding of `data`
    ///
    /// # Returns
    /// The stored item length in bytes (the fixed width for fixed-size fields).
    ///
    /// # Errors
    /// `NotText`, `IndexOutOfRange` for `index > item_count()`,
    /// `FixedSizeViolation` for a non-zero index or non-Latin-1 encoding on a
    /// fixed-size field, `Conversion` if transcoding fails or leaves an odd
    /// number of bytes for a UTF-16 field.
    ///
    /// On list and C-string fields, and whenever the field ends up with more
    /// than one item, the item is cut at its first terminator.
    pub fn set_text(
        &mut self,
        data: &[u8],
        index: usize,
        source: TextEncoding,
    ) -> Result<usize, FieldError> {
        self.ensure_text()?;
        if index > self.item_count {
            return Err(FieldError::IndexOutOfRange {
                index,
                count: self.item_count,
            });
        }
        if self.descriptor.is_fixed_size()
            && (index > 0 || self.encoding != TextEncoding::Latin1)
        {
            return Err(FieldError::FixedSizeViolation {
                index,
                encoding: self.encoding,
            });
        }

        let mut item = convert(data, source, self.encoding)?;
        if self.encoding.is_double_byte() && item.len() % 2 != 0 {
            return Err(ConversionError::OddLength { len: item.len() }.into());
        }

        // Items of multi-item layouts are C strings on the wire
        let item_total = self.item_count.max(index + 1);
        let cut = !self.descriptor.is_fixed_size()
            && (self.descriptor.is_list() || self.descriptor.is_cstring() || item_total > 1);
        if cut {
            let len = until_terminator(&item, self.encoding).len();
            item.truncate(len);
        }

        if self.descriptor.is_fixed_size() {
            let width = self.descriptor.fixed_size;
            let mut text = item;
            text.resize(width, 0);
            self.text = text;
        } else {
            let encoding = self.encoding;
            let before = self
                .items()
                .take(index)
                .map(|existing| if cut { until_terminator(existing, encoding) } else { existing });
            let after = self
                .items()
                .skip(index + 1)
                .map(|existing| if cut { until_terminator(existing, encoding) } else { existing });
            let text = join_items(
                before.chain(std::iter::once(item.as_slice())).chain(after),
                encoding,
            );
            self.text = text;
        }

        self.changed = true;
        if index >= self.item_count {
            self.item_count += 1;
        }
        Ok(self.raw_item_len(index))
    }

    /// Replaces the field with UTF-16 code units as its only item.
    ///
    /// # Errors
    /// `WidthMismatch` unless the field uses a UTF-16 encoding.
    pub fn set_unicode(&mut self, units: &[u16]) -> Result<usize, FieldError> {
        self.ensure_text()?;
        self.ensure_double_byte()?;
        self.clear();
        self.set_text(&units_to_bytes(units), 0, self.encoding)
    }

    /// Appends UTF-16 code units as a new trailing item.
    pub fn add_unicode(&mut self, units: &[u16]) -> Result<usize, FieldError> {
        self.ensure_text()?;
        self.ensure_double_byte()?;
        self.set_text(&units_to_bytes(units), self.item_count, self.encoding)
    }

    /// Copies up to `buf.len()` bytes of item `index` into `buf`.
    ///
    /// A NUL terminator is written only if the copy leaves room for it.
    ///
    /// # Returns
    /// Number of characters copied; 0 for an empty destination.
    ///
    /// # Errors
    /// `WidthMismatch` if the field uses a UTF-16 encoding.
    pub fn get(&self, buf: &mut [u8], index: usize) -> Result<usize, FieldError> {
        self.ensure_text()?;
        if !self.encoding.is_single_byte() {
            return Err(FieldError::WidthMismatch {
                encoding: self.encoding,
            });
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let item = self.raw_item(index)?;
        let len = item.len().min(buf.len());
        buf[..len].copy_from_slice(&item[..len]);
        if len < buf.len() {
            buf[len] = 0;
        }
        Ok(len)
    }

    /// Copies up to `buf.len()` UTF-16 code units of item `index` into `buf`.
    ///
    /// # Errors
    /// `WidthMismatch` if the field uses a single-byte encoding.
    pub fn get_unicode(&self, buf: &mut [u16], index: usize) -> Result<usize, FieldError> {
        self.ensure_text()?;
        self.ensure_double_byte()?;
        if buf.is_empty() {
            return Ok(0);
        }

        let item = self.raw_item(index)?;
        let mut len = 0;
        for (slot, unit) in buf.iter_mut().zip(item.chunks_exact(2)) {
            *slot = u16::from_be_bytes([unit[0], unit[1]]);
            len += 1;
        }
        if len < buf.len() {
            buf[len] = 0;
        }
        Ok(len)
    }

    /// Returns item `index` converted to `encoding`.
    pub fn get_text(&self, index: usize, encoding: TextEncoding) -> Result<Vec<u8>, FieldError> {
        let item = self.raw_item(index)?;
        Ok(convert(item, self.encoding, encoding)?)
    }

    /// Returns item `index` as a Rust string.
    pub fn get_string(&self, index: usize) -> Result<String, FieldError> {
        let bytes = self.get_text(index, TextEncoding::Utf8)?;
        String::from_utf8(bytes).map_err(|_| {
            FieldError::Conversion(crate::error::ConversionError::Malformed {
                from: self.encoding,
                to: TextEncoding::Utf8,
            })
        })
    }

    fn ensure_double_byte(&self) -> Result<(), FieldError> {
        if self.encoding.is_double_byte() {
            Ok(())
        } else {
            Err(FieldError::WidthMismatch {
                encoding: self.encoding,
            })
        }
    }
}

fn units_to_bytes(units: &[u16]) -> Vec<u8> {
    units.iter().flat_map(|unit| unit.to_be_bytes()).collect()
}

fn until_terminator(item: &[u8], encoding: TextEncoding) -> &[u8] {
    let end = if encoding.is_single_byte() {
        item.iter().position(|&b| b == 0)
    } else {
        item.chunks_exact(2)
            .position(|unit| unit == [0, 0])
            .map(|p| p * 2)
    };
    &item[..end.unwrap_or(item.len())]
}
