//! Frames made of several text fields read back to back from one stream.

use std::io::Cursor;

use ntest::timeout;
use tag_text::{FieldDescriptor, SliceReader, StreamReader, TagReader, TextEncoding, TextField};

/// Comment-style frame: language, description, text.
fn comment_fields(encoding: TextEncoding) -> [TextField; 3] {
    [
        TextField::new(FieldDescriptor::fixed(3)),
        TextField::new(FieldDescriptor::cstring().with_encoding(encoding)),
        TextField::new(FieldDescriptor::text().with_encoding(encoding)),
    ]
}

fn render_all(fields: &[TextField]) -> Vec<u8> {
    let mut out = Vec::new();
    for field in fields {
        field.render_text(&mut out).unwrap();
    }
    out
}

#[timeout(1000)]
#[test]
fn test_comment_frame_from_stream() -> anyhow::Result<()> {
    let mut fields = comment_fields(TextEncoding::Latin1);
    fields[0].set_str("eng")?;
    fields[1].set_str("liner notes")?;
    fields[2].set_str("Recorded live")?;
    let bytes = render_all(&fields);
    assert_eq!(bytes, b"engliner notes\0Recorded live");

    let mut reader = StreamReader::new(Cursor::new(bytes))?;
    let mut parsed = comment_fields(TextEncoding::Latin1);
    for field in parsed.iter_mut() {
        field.parse_text(&mut reader)?;
    }
    assert!(reader.at_end());
    assert_eq!(parsed[0].get_string(0)?, "eng");
    assert_eq!(parsed[1].get_string(0)?, "liner notes");
    assert_eq!(parsed[2].get_string(0)?, "Recorded live");
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_utf16_comment_frame_round_trip() -> anyhow::Result<()> {
    let mut fields = comment_fields(TextEncoding::Utf16);
    fields[0].set_str("deu")?;
    fields[1].set_str("Anmerkung")?;
    fields[2].set_str("Größe ♫")?;
    let bytes = render_all(&fields);

    let mut reader = SliceReader::new(&bytes);
    let mut parsed = comment_fields(TextEncoding::Utf16);
    for field in parsed.iter_mut() {
        field.parse_text(&mut reader)?;
    }
    assert_eq!(parsed[1].get_string(0)?, "Anmerkung");
    assert_eq!(parsed[2].get_string(0)?, "Größe ♫");
    assert_eq!(parsed[2].as_bytes(), fields[2].as_bytes());
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_list_field_last_in_frame() -> anyhow::Result<()> {
    let mut reader = SliceReader::new(b"\x01lead\0Vocals\0guitar\0Bass");
    let kind = reader.read_byte();
    assert_eq!(kind, Some(1));

    let mut list = TextField::new(FieldDescriptor::list());
    list.parse_text(&mut reader)?;
    assert_eq!(list.item_count(), 4);
    let items: Vec<&[u8]> = list.items().collect();
    assert_eq!(items, [&b"lead"[..], &b"Vocals"[..], &b"guitar"[..], &b"Bass"[..]]);
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_stream_reader_window_starts_at_current_position() -> anyhow::Result<()> {
    let mut cursor = Cursor::new(b"skipme|payload".to_vec());
    cursor.set_position(7);
    let mut reader = StreamReader::new(cursor)?;
    assert_eq!(reader.begin(), 7);
    assert_eq!(reader.remaining(), 7);

    let mut field = TextField::new(FieldDescriptor::text());
    field.parse_text(&mut reader)?;
    assert_eq!(field.raw_item(0)?, b"payload");
    Ok(())
}
