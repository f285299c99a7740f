//! Tag kinds and on-disk bookkeeping of a linked file.

use std::path::PathBuf;

use bitflags::bitflags;

bitflags! {
    /// Kinds of tag a file can carry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagKinds: u16 {
        /// Fixed 128-byte trailer at the end of the file
        const ID3V1 = 0x0001;
        /// Variable-size tag at the start of the file
        const ID3V2 = 0x0002;
        const APPENDED = Self::ID3V1.bits();
        const PREPENDED = Self::ID3V2.bits();
        const ALL = Self::ID3V1.bits() | Self::ID3V2.bits();
    }
}

/// What the engine believes about the linked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFileState {
    /// Linked path; `None` when unlinked or bound to a stream
    pub file_name: Option<PathBuf>,
    /// Bytes occupied by the prepended tag
    pub prepended_bytes: u64,
    /// Bytes occupied by appended tags
    pub appended_bytes: u64,
    /// Size of the file when last inspected
    pub file_size: u64,
    /// Tag kinds known to be present on disk
    pub present: TagKinds,
    /// In-memory content differs from what was last parsed or written
    pub changed: bool,
}

impl Default for TagFileState {
    fn default() -> Self {
        Self {
            file_name: None,
            prepended_bytes: 0,
            appended_bytes: 0,
            file_size: 0,
            present: TagKinds::empty(),
            changed: false,
        }
    }
}

impl TagFileState {
    /// Size of the media data between the tag regions.
    pub fn data_size(&self) -> u64 {
        self.file_size
            .saturating_sub(self.prepended_bytes)
            .saturating_sub(self.appended_bytes)
    }

    /// Forgets everything known about the on-disk regions.
    pub(crate) fn reset_regions(&mut self) {
        self.prepended_bytes = 0;
        self.appended_bytes = 0;
        self.file_size = 0;
        self.present = TagKinds::empty();
    }
}
