//! Memory and stream backed readers.

use std::io::{Read, Seek, SeekFrom};

use super::TagReader;

/// Reader over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the bytes not yet read.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

impl TagReader for SliceReader<'_> {
    fn begin(&self) -> u64 {
        0
    }

    fn end(&self) -> u64 {
        self.data.len() as u64
    }

    fn current(&self) -> u64 {
        self.pos as u64
    }

    fn set_current(&mut self, pos: u64) -> u64 {
        self.pos = usize::try_from(pos).map_or(self.data.len(), |p| p.min(self.data.len()));
        self.pos as u64
    }

    fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let rest = self.rest();
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        n
    }
}

/// Reader over a seekable stream such as an open file.
///
/// The readable window is fixed when the reader is created. Read errors end
/// the window early; they are logged but otherwise indistinguishable from
/// reaching the end of the stream.
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: R,
    begin: u64,
    end: u64,
    pos: u64,
}

impl<R: Read + Seek> StreamReader<R> {
    /// Creates a reader spanning from the stream's current position to its end.
    pub fn new(mut inner: R) -> std::io::Result<Self> {
        let begin = inner.stream_position()?;
        let end = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(begin))?;
        Ok(Self {
            inner,
            begin,
            end,
            pos: begin,
        })
    }

    /// Consumes the reader and returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> TagReader for StreamReader<R> {
    fn begin(&self) -> u64 {
        self.begin
    }

    fn end(&self) -> u64 {
        self.end
    }

    fn current(&self) -> u64 {
        self.pos
    }

    fn set_current(&mut self, pos: u64) -> u64 {
        let target = pos.clamp(self.begin, self.end);
        match self.inner.seek(SeekFrom::Start(target)) {
            Ok(p) => self.pos = p,
            Err(e) => {
                tracing::debug!("Seek to {} failed: {}", target, e);
                self.end = self.pos;
            }
        }
        self.pos
    }

    fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        let want = buf.len().min(remaining);
        if want == 0 {
            return 0;
        }
        loop {
            match self.inner.read(&mut buf[..want]) {
                Ok(0) => {
                    // Stream shorter than it claimed
                    self.end = self.pos;
                    return 0;
                }
                Ok(n) => {
                    self.pos += n as u64;
                    return n;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!("Read at offset {} failed: {}", self.pos, e);
                    self.end = self.pos;
                    return 0;
                }
            }
        }
    }
}
