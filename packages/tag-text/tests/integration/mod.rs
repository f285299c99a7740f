//! Integration tests for the text codec.
//!
//! 1. Conversion properties across all encodings
//! 2. Multi-field frames parsed from streams

pub mod conversion_tests;
pub mod frame_tests;
