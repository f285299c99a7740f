//! Wire format of text fields.

use std::io::{self, Write};

use crate::encoding::TextEncoding;
use crate::error::FieldError;
use crate::io::text::{
    read_string, read_text, read_unicode_string, read_unicode_text, write_string, write_text,
    write_unicode_string, write_unicode_text,
};
use crate::io::TagReader;

use super::TextField;

fn read_encoded_text<R: TagReader + ?Sized>(
    reader: &mut R,
    len: usize,
    encoding: TextEncoding,
) -> Vec<u8> {
    if encoding.is_single_byte() {
        read_text(reader, len)
    } else {
        read_unicode_text(reader, len)
    }
}

fn read_encoded_string<R: TagReader + ?Sized>(reader: &mut R, encoding: TextEncoding) -> Vec<u8> {
    if encoding.is_single_byte() {
        read_string(reader)
    } else {
        read_unicode_string(reader)
    }
}

fn write_encoded_text<W: Write + ?Sized>(
    writer: &mut W,
    data: &[u8],
    encoding: TextEncoding,
) -> io::Result<usize> {
    if encoding.is_single_byte() {
        write_text(writer, data)
    } else {
        write_unicode_text(writer, data, encoding == TextEncoding::Utf16)
    }
}

fn write_encoded_string<W: Write + ?Sized>(
    writer: &mut W,
    data: &[u8],
    encoding: TextEncoding,
) -> io::Result<usize> {
    if encoding.is_single_byte() {
        write_string(writer, data)
    } else {
        write_unicode_string(writer, data, encoding == TextEncoding::Utf16)
    }
}

impl TextField {
    /// Parses the field from `reader` according to its layout.
    ///
    /// Layout precedence: fixed size, list, C-string, rest of input. A list
    /// consumes every remaining string, so it must be the last field of its
    /// container. Running out of input is not an error; the field simply
    /// ends up shorter or empty. Clears the dirty flag on success.
    pub fn parse_text<R: TagReader + ?Sized>(&mut self, reader: &mut R) -> Result<(), FieldError> {
        self.ensure_text()?;
        tracing::trace!(
            begin = reader.begin(),
            current = reader.current(),
            end = reader.end(),
            "Parsing text field"
        );
        self.clear();

        let encoding = self.encoding;
        if self.descriptor.is_fixed_size() {
            let text = read_encoded_text(reader, self.descriptor.fixed_size, encoding);
            tracing::trace!("Fixed size string of {} bytes", text.len());
            self.set_text(&text, 0, encoding)?;
        } else if self.descriptor.is_list() {
            while !reader.at_end() {
                let text = read_encoded_string(reader, encoding);
                tracing::trace!("Adding list item of {} bytes", text.len());
                self.set_text(&text, self.item_count, encoding)?;
            }
        } else if self.descriptor.is_cstring() {
            let text = read_encoded_string(reader, encoding);
            tracing::trace!("Null terminated string of {} bytes", text.len());
            self.set_text(&text, 0, encoding)?;
        } else {
            let remaining = usize::try_from(reader.remaining()).unwrap_or(usize::MAX);
            let text = read_encoded_text(reader, remaining, encoding);
            tracing::trace!("Last field string of {} bytes", text.len());
            self.set_text(&text, self.item_count, encoding)?;
        }

        self.changed = false;
        Ok(())
    }

    /// Writes the field in the same layout [`parse_text`](Self::parse_text)
    /// reads.
    ///
    /// Fixed-size fields always produce exactly their width. C-string fields
    /// end with a terminator; other layouts write items separated by
    /// terminators with none after the last. With [`TextEncoding::Utf16`]
    /// every item is preceded by a byte order mark.
    ///
    /// Rendering does not touch the dirty flag; call
    /// [`mark_clean`](Self::mark_clean) once the output has been persisted.
    ///
    /// # Returns
    /// Number of bytes written.
    pub fn render_text<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        let encoding = self.encoding;

        if self.descriptor.is_fixed_size() {
            let mut fixed = self.text.clone();
            fixed.resize(self.descriptor.fixed_size, 0);
            return write_text(writer, &fixed);
        }

        if self.descriptor.is_cstring() {
            let item = self.items().next().unwrap_or_default();
            return write_encoded_string(writer, item, encoding);
        }

        let mut written = 0;
        for (i, item) in self.items().enumerate() {
            if i > 0 {
                written += write_text(writer, encoding.terminator())?;
            }
            written += write_encoded_text(writer, item, encoding)?;
        }
        Ok(written)
    }

    /// Renders the field into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.text.len() + 4);
        // Writing to a Vec cannot fail
        let _ = self.render_text(&mut out);
        out
    }
}
