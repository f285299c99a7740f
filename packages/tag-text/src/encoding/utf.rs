//! Strict UTF-8 <-> UTF-16 transcoding.

use crate::error::ConversionError;

use super::TextEncoding;

pub(super) fn utf8_to_utf16(
    data: &[u8],
    from: TextEncoding,
    to: TextEncoding,
) -> Result<Vec<u8>, ConversionError> {
    let text = std::str::from_utf8(data).map_err(|_| ConversionError::Malformed { from, to })?;
    let mut out = Vec::with_capacity(data.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    Ok(out)
}

pub(super) fn utf16_to_utf8(
    data: &[u8],
    from: TextEncoding,
    to: TextEncoding,
) -> Result<Vec<u8>, ConversionError> {
    if data.len() % 2 != 0 {
        return Err(ConversionError::OddLength { len: data.len() });
    }
    let units = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    let text = char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| ConversionError::Malformed { from, to })?;
    Ok(text.into_bytes())
}
