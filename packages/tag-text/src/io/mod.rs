//! Sequential byte readers used by the text codec.
//!
//! The field model only depends on [`TagReader`]: a forward reader with
//! position queries. [`SliceReader`] reads from memory, [`StreamReader`]
//! from any `Read + Seek` source such as an open file.

mod reader;
pub mod text;

pub use reader::{SliceReader, StreamReader};

/// Sequential byte source with position queries.
///
/// Positions are absolute offsets into the underlying source. `begin` and
/// `end` delimit the readable window; `current` always lies inside it.
pub trait TagReader {
    /// Offset of the first readable byte.
    fn begin(&self) -> u64;

    /// Offset one past the last readable byte.
    fn end(&self) -> u64;

    /// Offset of the next byte to be read.
    fn current(&self) -> u64;

    /// Moves the cursor, clamped to the readable window.
    ///
    /// # Returns
    /// The new cursor position.
    fn set_current(&mut self, pos: u64) -> u64;

    /// Reads up to `buf.len()` bytes, returning how many were read.
    ///
    /// Returns 0 only at the end of the window (or after an unrecoverable
    /// read failure, which is treated the same way).
    fn read_into(&mut self, buf: &mut [u8]) -> usize;

    /// Returns `true` if no bytes remain.
    fn at_end(&self) -> bool {
        self.current() >= self.end()
    }

    /// Number of bytes between the cursor and the end of the window.
    fn remaining(&self) -> u64 {
        self.end().saturating_sub(self.current())
    }

    /// Reads a single byte.
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.read_into(&mut byte) {
            1 => Some(byte[0]),
            _ => None,
        }
    }

    /// Reads up to `len` bytes into a new vector.
    fn read_bytes(&mut self, len: usize) -> Vec<u8> {
        let len = len.min(usize::try_from(self.remaining()).unwrap_or(usize::MAX));
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = self.read_into(&mut buf[filled..]);
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        buf
    }

    /// Advances the cursor by up to `len` bytes.
    ///
    /// # Returns
    /// The number of bytes actually skipped.
    fn skip(&mut self, len: u64) -> u64 {
        let start = self.current();
        self.set_current(start.saturating_add(len)) - start
    }
}
