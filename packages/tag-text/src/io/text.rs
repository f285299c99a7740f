//! Reading and writing raw text strings.
//!
//! Single-byte helpers work on Latin-1/UTF-8 bytes. Unicode helpers work on
//! UTF-16 and always hand back big-endian code units without a byte order
//! mark, whatever order the source used.

use std::io::{self, Write};

use super::TagReader;

const BOM_BE: [u8; 2] = [0xfe, 0xff];
const BOM_LE: [u8; 2] = [0xff, 0xfe];

/// Reads up to `len` bytes of single-byte text.
pub fn read_text<R: TagReader + ?Sized>(reader: &mut R, len: usize) -> Vec<u8> {
    reader.read_bytes(len)
}

/// Reads a NUL-terminated single-byte string.
///
/// The terminator is consumed but not returned. A string running to the end
/// of the input is returned as is.
pub fn read_string<R: TagReader + ?Sized>(reader: &mut R) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(c) = reader.read_byte() {
        if c == 0 {
            break;
        }
        out.push(c);
    }
    out
}

/// Reads `len` bytes of UTF-16 text, honouring a leading byte order mark.
///
/// A trailing odd byte is consumed and dropped.
pub fn read_unicode_text<R: TagReader + ?Sized>(reader: &mut R, len: usize) -> Vec<u8> {
    let raw = reader.read_bytes(len);
    let mut units = raw.chunks_exact(2);
    let little_endian = match units.clone().next() {
        Some(bom) if bom == BOM_LE => {
            units.next();
            true
        }
        Some(bom) if bom == BOM_BE => {
            units.next();
            false
        }
        _ => false,
    };

    let mut out = Vec::with_capacity(raw.len());
    for unit in units {
        push_unit(&mut out, [unit[0], unit[1]], little_endian);
    }
    out
}

/// Reads a UTF-16 string terminated by a 0x0000 code unit.
///
/// The terminator is consumed but not returned.
pub fn read_unicode_string<R: TagReader + ?Sized>(reader: &mut R) -> Vec<u8> {
    let mut out = Vec::new();
    let mut little_endian = false;
    let mut first = true;
    while let Some(unit) = read_unit(reader) {
        if unit == [0, 0] {
            break;
        }
        if first {
            first = false;
            if unit == BOM_LE {
                little_endian = true;
                continue;
            }
            if unit == BOM_BE {
                continue;
            }
        }
        push_unit(&mut out, unit, little_endian);
    }
    out
}

fn read_unit<R: TagReader + ?Sized>(reader: &mut R) -> Option<[u8; 2]> {
    let hi = reader.read_byte()?;
    let lo = reader.read_byte()?;
    Some([hi, lo])
}

fn push_unit(out: &mut Vec<u8>, unit: [u8; 2], little_endian: bool) {
    if little_endian {
        out.extend_from_slice(&[unit[1], unit[0]]);
    } else {
        out.extend_from_slice(&unit);
    }
}

/// Writes single-byte text without a terminator.
pub fn write_text<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> io::Result<usize> {
    writer.write_all(data)?;
    Ok(data.len())
}

/// Writes single-byte text followed by a NUL terminator.
pub fn write_string<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> io::Result<usize> {
    let written = write_text(writer, data)?;
    writer.write_all(&[0])?;
    Ok(written + 1)
}

/// Writes big-endian UTF-16 text, optionally preceded by a byte order mark.
pub fn write_unicode_text<W: Write + ?Sized>(
    writer: &mut W,
    data: &[u8],
    bom: bool,
) -> io::Result<usize> {
    let mut written = 0;
    if bom {
        writer.write_all(&BOM_BE)?;
        written += BOM_BE.len();
    }
    writer.write_all(data)?;
    Ok(written + data.len())
}

/// Writes big-endian UTF-16 text followed by a 0x0000 terminator.
pub fn write_unicode_string<W: Write + ?Sized>(
    writer: &mut W,
    data: &[u8],
    bom: bool,
) -> io::Result<usize> {
    let written = write_unicode_text(writer, data, bom)?;
    writer.write_all(&[0, 0])?;
    Ok(written + 2)
}
