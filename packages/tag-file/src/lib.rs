//! Tag persistence for media files.
//!
//! Tracks how many bytes of a file are occupied by a prepended tag and an
//! appended trailer, renders tags into those regions, and rewrites the file
//! through a temporary copy whenever the prepended region changes size.

pub mod config;
pub mod content;
pub mod error;
pub mod format;
pub mod fs;
pub mod tag_file;

pub use config::TagFileConfig;
pub use content::{BasicTag, TagContent};
pub use error::TagError;
pub use format::{PrependedHeader, TrailerFields};
pub use fs::{FileMode, FileSystem, MemoryFileSystem, StdFileSystem};
pub use tag_file::{TagFile, TagFileState, TagKinds};
