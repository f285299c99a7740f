//! Text codec for media metadata tags.
//!
//! Provides encoding conversion between Latin-1, UTF-8 and UTF-16, a
//! sequential reader abstraction, and the text field model used to store
//! and (de)serialize fixed-size, list, C-string and remainder text fields.

pub mod encoding;
pub mod error;
pub mod field;
pub mod io;

pub use encoding::{convert, TextEncoding};
pub use error::{ConversionError, FieldError};
pub use field::{FieldDescriptor, FieldFlags, FieldType, ItemSpan, TextField};
pub use io::{SliceReader, StreamReader, TagReader};
