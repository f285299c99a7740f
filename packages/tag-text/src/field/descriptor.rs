//! Static field layout descriptions.

use bitflags::bitflags;

use crate::encoding::TextEncoding;

/// Kind of value a field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Text in one of the tag text encodings
    Text,
    /// Big-endian unsigned integer
    Integer,
    /// Opaque bytes
    Binary,
}

bitflags! {
    /// Layout flags of a text field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// Unbounded item list consuming the rest of the input
        const LIST = 1 << 0;
        /// Single NUL-terminated item
        const CSTR = 1 << 1;
    }
}

/// Describes how a field is laid out on the wire.
///
/// Layout precedence when parsing is fixed size, then list, then C-string,
/// then "rest of input".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub field_type: FieldType,
    /// Width in bytes for fixed-size fields, 0 otherwise
    pub fixed_size: usize,
    pub flags: FieldFlags,
    pub default_encoding: TextEncoding,
}

impl FieldDescriptor {
    /// A text field consuming all remaining input as one item.
    pub const fn text() -> Self {
        Self {
            field_type: FieldType::Text,
            fixed_size: 0,
            flags: FieldFlags::empty(),
            default_encoding: TextEncoding::Latin1,
        }
    }

    /// A single Latin-1 item of exactly `size` bytes.
    pub const fn fixed(size: usize) -> Self {
        Self {
            fixed_size: size,
            ..Self::text()
        }
    }

    /// An item list consuming all remaining input.
    pub const fn list() -> Self {
        Self {
            flags: FieldFlags::LIST,
            ..Self::text()
        }
    }

    /// A single NUL-terminated item.
    pub const fn cstring() -> Self {
        Self {
            flags: FieldFlags::CSTR,
            ..Self::text()
        }
    }

    /// A field of a non-text type.
    pub const fn of_type(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Self::text()
        }
    }

    /// Returns the descriptor with a different default encoding.
    pub const fn with_encoding(self, default_encoding: TextEncoding) -> Self {
        Self {
            default_encoding,
            ..self
        }
    }

    pub const fn is_text(&self) -> bool {
        matches!(self.field_type, FieldType::Text)
    }

    pub const fn is_fixed_size(&self) -> bool {
        self.fixed_size > 0
    }

    pub const fn is_list(&self) -> bool {
        self.flags.contains(FieldFlags::LIST)
    }

    pub const fn is_cstring(&self) -> bool {
        self.flags.contains(FieldFlags::CSTR)
    }
}

impl Default for FieldDescriptor {
    fn default() -> Self {
        Self::text()
    }
}
