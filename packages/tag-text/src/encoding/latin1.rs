//! Conversions into and out of ISO-8859-1.

use crate::error::ConversionError;

use super::sanitize;

/// Widens Latin-1 to UTF-8; bytes >= 0x80 map to the identical code point.
pub(super) fn to_utf8(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for &c in data {
        if c >= 0x80 {
            out.push(0xc0 | (c >> 6));
            out.push(0x80 | (c & 0x3f));
        } else {
            out.push(sanitize(c));
        }
    }
    out
}

/// Widens every Latin-1 byte to one big-endian UTF-16 code unit.
pub(super) fn to_utf16(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for &c in data {
        out.push(0);
        out.push(sanitize(c));
    }
    out
}

/// Narrows UTF-8 to Latin-1.
///
/// Only two-byte sequences are understood: the result keeps the low two bits
/// of the lead byte and the low six bits of the continuation byte. Decoding
/// stops cleanly if the input ends inside a sequence.
pub(super) fn from_utf8(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().copied();
    while let Some(c) = iter.next() {
        if c >= 0x80 {
            match iter.next() {
                Some(c2) if c2 != 0 => out.push(((c & 0x03) << 6) | (c2 & 0x3f)),
                _ => break,
            }
        } else {
            out.push(sanitize(c));
        }
    }
    out
}

/// Keeps the low byte of every big-endian UTF-16 code unit.
pub(super) fn from_utf16(data: &[u8]) -> Result<Vec<u8>, ConversionError> {
    if data.len() % 2 != 0 {
        return Err(ConversionError::OddLength { len: data.len() });
    }
    Ok(data.chunks_exact(2).map(|unit| sanitize(unit[1])).collect())
}
