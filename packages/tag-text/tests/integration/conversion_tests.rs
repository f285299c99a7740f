//! Conversion properties over the full printable and control ranges.

use ntest::timeout;
use tag_text::{convert, ConversionError, TextEncoding};

#[timeout(1000)]
#[test]
fn test_printable_round_trip_through_every_encoding() {
    let printable: Vec<u8> = (0x20u8..=0x7e).collect();
    for target in [
        TextEncoding::Utf8,
        TextEncoding::Utf16,
        TextEncoding::Utf16Be,
    ] {
        let there = convert(&printable, TextEncoding::Latin1, target).unwrap();
        let back = convert(&there, target, TextEncoding::Latin1).unwrap();
        assert_eq!(back, printable, "round trip via {:?}", target);
    }
}

#[timeout(1000)]
#[test]
fn test_every_illegal_control_byte_is_substituted() {
    for c in 0u8..0x20 {
        let legal = matches!(c, 0x00 | 0x09 | 0x0a | 0x0d);
        let expected = if legal { c } else { b'?' };

        let utf8 = convert(&[c], TextEncoding::Latin1, TextEncoding::Utf8).unwrap();
        assert_eq!(utf8, [expected], "latin1 -> utf8 of {:#04x}", c);

        let wide = convert(&[c], TextEncoding::Latin1, TextEncoding::Utf16).unwrap();
        assert_eq!(wide, [0, expected], "latin1 -> utf16 of {:#04x}", c);

        let narrow = convert(&[0, c], TextEncoding::Utf16, TextEncoding::Latin1).unwrap();
        assert_eq!(narrow, [expected], "utf16 -> latin1 of {:#04x}", c);

        let from_utf8 = convert(&[c], TextEncoding::Utf8, TextEncoding::Latin1).unwrap();
        assert_eq!(from_utf8, [expected], "utf8 -> latin1 of {:#04x}", c);
    }
}

#[timeout(1000)]
#[test]
fn test_full_latin1_range_survives_utf8_and_utf16() {
    let upper: Vec<u8> = (0xa0u8..=0xff).collect();
    let utf8 = convert(&upper, TextEncoding::Latin1, TextEncoding::Utf8).unwrap();
    assert_eq!(
        String::from_utf8(utf8.clone()).unwrap(),
        upper.iter().map(|&b| char::from(b)).collect::<String>()
    );
    let wide = convert(&utf8, TextEncoding::Utf8, TextEncoding::Utf16).unwrap();
    assert_eq!(
        convert(&wide, TextEncoding::Utf16, TextEncoding::Latin1).unwrap(),
        upper
    );
}

#[timeout(1000)]
#[test]
fn test_failures_are_distinguishable_from_empty_output() {
    assert_eq!(
        convert(b"", TextEncoding::Utf8, TextEncoding::Utf16),
        Ok(Vec::new())
    );
    assert!(matches!(
        convert(b"\x80", TextEncoding::Utf8, TextEncoding::Utf16Be),
        Err(ConversionError::Malformed { .. })
    ));
}
