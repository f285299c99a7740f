//! Tag file persistence engine.
//!
//! A [`TagFile`] binds tag content to a file, remembers how many bytes the
//! prepended and appended tags occupy, and writes changed content back. When
//! the prepended tag keeps its size it is overwritten in place; otherwise the
//! whole file is rewritten through a temporary copy.

pub mod io_utils;
mod rewrite;
mod state;

#[cfg(test)]
mod test;

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tag_text::{StreamReader, TagReader};

use crate::config::TagFileConfig;
use crate::content::TagContent;
use crate::error::TagError;
use crate::format::{has_trailer_marker, PrependedHeader, HEADER_LEN, TRAILER_LEN};
use crate::fs::{FileSystem, StdFileSystem};

use io_utils::classify_io_error;
use rewrite::rewrite_file;

pub use state::{TagFileState, TagKinds};

/// Tag content bound to a file on a [`FileSystem`].
#[derive(Debug)]
pub struct TagFile<C, F = StdFileSystem> {
    content: C,
    fs: F,
    config: TagFileConfig,
    state: TagFileState,
    /// Kinds requested at link time
    parse_kinds: TagKinds,
}

impl<C: TagContent> TagFile<C, StdFileSystem> {
    /// Creates an unlinked tag file on the real filesystem.
    pub fn new(content: C) -> Self {
        Self {
            content,
            fs: StdFileSystem,
            config: TagFileConfig::default(),
            state: TagFileState::default(),
            parse_kinds: TagKinds::ALL,
        }
    }
}

impl<C: TagContent, F: FileSystem> TagFile<C, F> {
    /// Creates an unlinked tag file on `fs`.
    ///
    /// # Errors
    /// `InvalidConfig` if `config` fails validation.
    pub fn with_file_system(content: C, fs: F, config: TagFileConfig) -> Result<Self, TagError> {
        config.validate()?;
        Ok(Self {
            content,
            fs,
            config,
            state: TagFileState::default(),
            parse_kinds: TagKinds::ALL,
        })
    }

    /// Binds to the file at `path` and parses its tags.
    ///
    /// The prepended tag is always parsed; the appended trailer only when
    /// `kinds` contains [`TagKinds::APPENDED`]. A missing file is not an
    /// error: it links with nothing present and is created by
    /// [`update`](Self::update).
    ///
    /// # Arguments
    /// * `path` - File to bind to
    /// * `kinds` - Tag kinds to parse
    ///
    /// # Returns
    /// The number of bytes occupied by the prepended tag.
    pub fn link(&mut self, path: impl AsRef<Path>, kinds: TagKinds) -> Result<u64, TagError> {
        let path = path.as_ref();
        self.state.file_name = Some(path.to_path_buf());
        self.parse_kinds = kinds;
        self.state.changed = true;
        self.state.reset_regions();

        if !self.fs.exists(path) {
            tracing::debug!("Linked to absent file {}", path.display());
            return Ok(0);
        }

        let file = self
            .fs
            .open_read(path)
            .map_err(|e| classify_io_error(e, "Failed to open file for parsing"))?;
        self.parse_stream(file)
    }

    /// Binds to `path`, parsing the appended trailer only if `parse_appended`.
    pub fn link_with_options(
        &mut self,
        path: impl AsRef<Path>,
        parse_appended: bool,
    ) -> Result<u64, TagError> {
        let kinds = if parse_appended {
            TagKinds::ALL
        } else {
            TagKinds::PREPENDED
        };
        self.link(path, kinds)
    }

    /// Parses tags from a stream, starting at its current position.
    ///
    /// The tag is left without a file name, so [`update`](Self::update) and
    /// [`strip`](Self::strip) fail with `NotLinked`.
    pub fn link_reader<R: Read + Seek>(
        &mut self,
        reader: R,
        kinds: TagKinds,
    ) -> Result<u64, TagError> {
        self.state.file_name = None;
        self.parse_kinds = kinds;
        self.state.changed = true;
        self.state.reset_regions();
        self.parse_stream(reader)
    }

    fn parse_stream<R: Read + Seek>(&mut self, stream: R) -> Result<u64, TagError> {
        let mut reader = StreamReader::new(stream)
            .map_err(|e| classify_io_error(e, "Failed to inspect stream"))?;
        let begin = reader.begin();
        let end = reader.end();
        self.state.file_size = end - begin;

        let head = reader.read_bytes(HEADER_LEN);
        if let Some(header) = PrependedHeader::parse(&head) {
            let total = header.total_size().min(self.state.file_size);
            reader.set_current(begin);
            let region = reader.read_bytes(usize::try_from(total).unwrap_or(usize::MAX));
            if let Err(e) = self.content.parse_prepended(&region) {
                tracing::warn!("Failed to parse prepended tag: {}", e);
            }
            self.state.prepended_bytes = total;
            self.state.present |= TagKinds::PREPENDED;
            tracing::debug!(
                major = header.major,
                size = total,
                "Found prepended tag"
            );
        }

        let trailer_len = TRAILER_LEN as u64;
        if self.parse_kinds.contains(TagKinds::APPENDED)
            && self.state.file_size >= self.state.prepended_bytes + trailer_len
        {
            reader.set_current(end - trailer_len);
            let trailer = reader.read_bytes(TRAILER_LEN);
            if trailer.len() == TRAILER_LEN && has_trailer_marker(&trailer) {
                if let Err(e) = self.content.parse_appended(&trailer) {
                    tracing::warn!("Failed to parse appended tag: {}", e);
                }
                self.state.appended_bytes = trailer_len;
                self.state.present |= TagKinds::APPENDED;
                tracing::debug!("Found appended tag");
            }
        }

        Ok(self.state.prepended_bytes)
    }

    /// Writes changed or missing tags of the requested kinds to the linked
    /// file, creating it if absent.
    ///
    /// A prepended tag whose size changed triggers a full rewrite; if that
    /// rewrite fails the kind is left out of the result and the rest of the
    /// update proceeds.
    ///
    /// # Returns
    /// The tag kinds actually written. Removing a prepended tag by rendering
    /// an empty one does not count as writing it.
    ///
    /// # Errors
    /// `NotLinked` without a file name, `ReadOnly` if the file cannot be
    /// opened for writing, other I/O errors as classified.
    pub fn update(&mut self, kinds: TagKinds) -> Result<TagKinds, TagError> {
        let path = self.linked_path()?;
        let mut file = if self.fs.exists(&path) {
            self.fs.open_read_write(&path)
        } else {
            self.fs.create(&path)
        }
        .map_err(|e| classify_io_error(e, "Failed to open file for update"))?;
        self.state.file_size = self
            .fs
            .file_size(&path)
            .map_err(|e| classify_io_error(e, "Failed to get file size"))?;

        let mut written = TagKinds::empty();

        if kinds.contains(TagKinds::PREPENDED) && self.needs_write(TagKinds::PREPENDED) {
            let mut payload = Vec::new();
            self.content.render_prepended(&mut payload)?;
            let new_size = payload.len() as u64;

            if new_size == 0 && self.state.prepended_bytes == 0 {
                tracing::debug!("No prepended tag to write");
            } else if new_size == self.state.prepended_bytes || self.state.file_size == 0 {
                tracing::debug!(size = new_size, "Writing prepended tag in place");
                match write_at(&mut file, 0, &payload) {
                    Ok(()) => {
                        self.record_prepended(new_size);
                        written |= TagKinds::PREPENDED;
                    }
                    Err(e) => tracing::warn!("Failed to write prepended tag: {}", e),
                }
            } else {
                tracing::debug!(
                    old = self.state.prepended_bytes,
                    new = new_size,
                    "Prepended tag changed size, rewriting file"
                );
                drop(file);
                match rewrite_file(
                    &self.fs,
                    &path,
                    self.state.prepended_bytes,
                    &payload,
                    &self.config,
                ) {
                    Ok(size) => {
                        self.record_prepended(size);
                        if size > 0 {
                            written |= TagKinds::PREPENDED;
                        }
                    }
                    Err(e) => tracing::warn!("Failed to rewrite {}: {}", path.display(), e),
                }
                file = self
                    .fs
                    .open_read_write(&path)
                    .map_err(|e| classify_io_error(e, "Failed to reopen file after rewrite"))?;
            }
            self.state.file_size = self
                .fs
                .file_size(&path)
                .map_err(|e| classify_io_error(e, "Failed to get file size"))?;
        }

        if kinds.contains(TagKinds::APPENDED) && self.needs_write(TagKinds::APPENDED) {
            let mut trailer = Vec::with_capacity(TRAILER_LEN);
            self.content.render_appended(&mut trailer)?;
            if trailer.len() != TRAILER_LEN {
                return Err(TagError::InvalidTrailer {
                    expected: TRAILER_LEN,
                    got: trailer.len(),
                });
            }

            match self.write_trailer(&mut file, &trailer) {
                Ok(appended) => {
                    if appended {
                        self.state.appended_bytes += TRAILER_LEN as u64;
                    } else {
                        self.state.appended_bytes =
                            self.state.appended_bytes.max(TRAILER_LEN as u64);
                    }
                    self.state.present |= TagKinds::APPENDED;
                    written |= TagKinds::APPENDED;
                }
                Err(e) => tracing::warn!("Failed to write appended tag: {}", e),
            }
        }

        file.flush()
            .map_err(|e| classify_io_error(e, "Failed to flush file"))?;
        drop(file);

        self.state.file_size = self
            .fs
            .file_size(&path)
            .map_err(|e| classify_io_error(e, "Failed to get file size"))?;
        self.state.changed = false;
        self.content.mark_clean();
        Ok(written)
    }

    /// Overwrites an existing trailer or appends a new one.
    ///
    /// # Returns
    /// `true` if the trailer was appended.
    fn write_trailer(&self, file: &mut F::File, trailer: &[u8]) -> Result<bool, TagError> {
        let trailer_len = TRAILER_LEN as u64;
        let mut has_marker = false;
        if self.state.file_size >= self.state.prepended_bytes + trailer_len {
            let mut marker = [0u8; 3];
            file.seek(SeekFrom::End(-(TRAILER_LEN as i64)))
                .and_then(|_| file.read_exact(&mut marker))
                .map_err(|e| classify_io_error(e, "Failed to read trailer marker"))?;
            has_marker = has_trailer_marker(&marker);
        }

        if has_marker {
            tracing::debug!("Overwriting appended tag");
            file.seek(SeekFrom::End(-(TRAILER_LEN as i64)))
                .and_then(|_| file.write_all(trailer))
                .map_err(|e| classify_io_error(e, "Failed to overwrite trailer"))?;
        } else {
            tracing::debug!("Appending new appended tag");
            file.seek(SeekFrom::End(0))
                .and_then(|_| file.write_all(trailer))
                .map_err(|e| classify_io_error(e, "Failed to append trailer"))?;
        }
        Ok(!has_marker)
    }

    /// Removes tags of the requested kinds from the linked file.
    ///
    /// The prepended tag is removed by a full rewrite, appended tags by
    /// truncating the file. Stripping what is not there is a no-op.
    ///
    /// Marks the tag changed when anything was removed.
    ///
    /// # Returns
    /// The tag kinds actually removed.
    ///
    /// # Errors
    /// `NotLinked` without a file name; rewrite and truncate failures abort
    /// the call.
    pub fn strip(&mut self, kinds: TagKinds) -> Result<TagKinds, TagError> {
        let path = self.linked_path()?;
        self.state.file_size = self
            .fs
            .file_size(&path)
            .map_err(|e| classify_io_error(e, "Failed to get file size"))?;
        let data_size = self.state.data_size();
        let mut stripped = TagKinds::empty();

        if kinds.contains(TagKinds::PREPENDED) && self.state.prepended_bytes > 0 {
            rewrite_file(
                &self.fs,
                &path,
                self.state.prepended_bytes,
                &[],
                &self.config,
            )?;
            self.state.prepended_bytes = 0;
            self.state.present.remove(TagKinds::PREPENDED);
            stripped |= TagKinds::PREPENDED;
        }

        if kinds.contains(TagKinds::APPENDED) && self.state.appended_bytes > 0 {
            let new_size = data_size + self.state.prepended_bytes;
            tracing::debug!(size = new_size, "Truncating appended tags");
            self.fs
                .truncate(&path, new_size)
                .map_err(|e| classify_io_error(e, "Failed to truncate file"))?;
            self.state.appended_bytes = 0;
            self.state.present.remove(TagKinds::APPENDED);
            stripped |= TagKinds::APPENDED;
        }

        if !stripped.is_empty() {
            // Content still holds what was just removed from disk
            self.state.changed = true;
        }
        self.state.file_size = match self.fs.file_size(&path) {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!("Failed to get size of {}: {}", path.display(), e);
                data_size + self.state.prepended_bytes + self.state.appended_bytes
            }
        };
        Ok(stripped)
    }

    fn linked_path(&self) -> Result<PathBuf, TagError> {
        self.state.file_name.clone().ok_or(TagError::NotLinked)
    }

    fn needs_write(&self, kind: TagKinds) -> bool {
        self.state.changed || !self.state.present.contains(kind)
    }

    fn record_prepended(&mut self, size: u64) {
        self.state.prepended_bytes = size;
        if size > 0 {
            self.state.present |= TagKinds::PREPENDED;
        } else {
            self.state.present.remove(TagKinds::PREPENDED);
        }
    }

    /// Bytes occupied by the prepended tag.
    pub fn prepended_bytes(&self) -> u64 {
        self.state.prepended_bytes
    }

    /// Bytes occupied by appended tags.
    pub fn appended_bytes(&self) -> u64 {
        self.state.appended_bytes
    }

    /// File size when last inspected.
    pub fn file_size(&self) -> u64 {
        self.state.file_size
    }

    /// File size minus both tag regions.
    pub fn data_size(&self) -> u64 {
        self.state.data_size()
    }

    /// Returns `true` if every kind in `kind` is present on disk.
    pub fn has_tag_type(&self, kind: TagKinds) -> bool {
        self.state.present.contains(kind)
    }

    pub fn has_changed(&self) -> bool {
        self.state.changed
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.state.file_name.as_deref()
    }

    pub fn state(&self) -> &TagFileState {
        &self.state
    }

    pub fn config(&self) -> &TagFileConfig {
        &self.config
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    /// Mutable access to the content; marks the tag as changed.
    pub fn content_mut(&mut self) -> &mut C {
        self.state.changed = true;
        &mut self.content
    }

    pub fn into_content(self) -> C {
        self.content
    }
}

fn write_at<W: Write + Seek>(file: &mut W, offset: u64, data: &[u8]) -> Result<(), TagError> {
    file.seek(SeekFrom::Start(offset))
        .and_then(|_| file.write_all(data))
        .map_err(|e| classify_io_error(e, "Failed to write tag"))
}
