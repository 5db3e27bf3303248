//! Archive container: locate, index, mutate, reassemble
//!
//! `ZipArchive` parses a whole archive out of one byte buffer, keeps its
//! entries in an insertion-ordered name-keyed table, and rebuilds the
//! canonical byte stream on demand. All operations are synchronous and run
//! to completion; a parse failure is terminal and never yields a partially
//! populated archive.

use crate::entry::ZipEntry;
use crate::error::{MZipError, Result};
use crate::headers::{EntryHeader, MainHeader, CENHDR, ENDHDR, END_SIG, MAX_COMMENT};
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;

/// In-memory ZIP archive
///
/// The entry table is one insertion-ordered map, so the iteration order and
/// the name index cannot diverge; `total_entries` always equals its
/// cardinality.
pub struct ZipArchive {
    entries: IndexMap<String, ZipEntry>,
    main_header: MainHeader,
    comment: Vec<u8>,
}

impl Default for ZipArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        ZipArchive {
            entries: IndexMap::new(),
            main_header: MainHeader::default(),
            comment: Vec::new(),
        }
    }

    /// Read an archive from a file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let buffer = std::fs::read(path)?;
        Self::from_buffer(buffer)
    }

    /// Parse an archive out of a byte buffer.
    ///
    /// The buffer is retained and shared into the entries, which reference
    /// their compressed payload ranges inside it until their content is
    /// replaced.
    pub fn from_buffer(buffer: Vec<u8>) -> Result<Self> {
        let source = Arc::new(buffer);

        let eocd_offset = Self::find_eocd(&source)?;
        let mut main_header = MainHeader::from_bytes(&source[eocd_offset..])?;

        let comment = if main_header.comment_length > 0 {
            let start = eocd_offset + ENDHDR;
            let end = (start + main_header.comment_length as usize).min(source.len());
            source[start..end].to_vec()
        } else {
            Vec::new()
        };

        if main_header.offset as usize + main_header.size as usize > source.len() {
            return Err(MZipError::InvalidFormat(
                "central directory out of bounds".to_string(),
            ));
        }

        let entries = Self::read_entries(&source, &main_header)?;
        main_header.total_entries = entries.len() as u16;

        Ok(ZipArchive {
            entries,
            main_header,
            comment,
        })
    }

    /// Scan backward for the end of central directory record.
    ///
    /// The record may be trailed by up to `MAX_COMMENT` bytes of archive
    /// comment, so the search window covers the last `ENDHDR + MAX_COMMENT`
    /// bytes. The match closest to the end wins.
    fn find_eocd(buffer: &[u8]) -> Result<usize> {
        if buffer.len() >= ENDHDR {
            let start = buffer.len() - ENDHDR;
            let floor = start.saturating_sub(MAX_COMMENT);
            for i in (floor..=start).rev() {
                if buffer[i] != 0x50 {
                    continue;
                }
                let signature =
                    u32::from_le_bytes([buffer[i], buffer[i + 1], buffer[i + 2], buffer[i + 3]]);
                if signature == END_SIG {
                    return Ok(i);
                }
            }
        }
        Err(MZipError::InvalidFormat(
            "end of central directory record not found".to_string(),
        ))
    }

    /// Walk the central directory, materializing one entry per record.
    ///
    /// Reads exactly `disk_entries` records starting at the recorded offset.
    /// Running past the buffer end before that count is satisfied means the
    /// directory is truncated or inconsistent.
    fn read_entries(
        source: &Arc<Vec<u8>>,
        main_header: &MainHeader,
    ) -> Result<IndexMap<String, ZipEntry>> {
        let mut entries = IndexMap::with_capacity(main_header.disk_entries as usize);
        let mut index = main_header.offset as usize;

        for _ in 0..main_header.disk_entries {
            if index + CENHDR > source.len() {
                return Err(MZipError::InvalidFormat(
                    "central directory truncated".to_string(),
                ));
            }
            let header = EntryHeader::from_bytes(&source[index..index + CENHDR])?;
            let record_size = header.entry_header_size();
            if index + record_size > source.len() {
                return Err(MZipError::InvalidFormat(
                    "central directory truncated".to_string(),
                ));
            }

            let mut cursor = index + CENHDR;
            let name =
                String::from_utf8_lossy(&source[cursor..cursor + header.name_length as usize])
                    .into_owned();
            cursor += header.name_length as usize;

            let extra = source[cursor..cursor + header.extra_length as usize].to_vec();
            cursor += header.extra_length as usize;

            let comment = source[cursor..cursor + header.comment_length as usize].to_vec();

            index += record_size;

            let entry = ZipEntry::from_archive(Arc::clone(source), header, name, extra, comment);
            entries.insert(entry.name().to_string(), entry);
        }

        Ok(entries)
    }

    /// Archive comment bytes
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    /// Replace the archive comment, truncated to the format's `MAX_COMMENT`
    /// limit
    pub fn set_comment(&mut self, comment: impl Into<Vec<u8>>) {
        let mut comment = comment.into();
        comment.truncate(MAX_COMMENT);
        self.main_header.comment_length = comment.len() as u16;
        self.comment = comment;
    }

    /// Entries in their currently stored order
    pub fn entries(&self) -> impl Iterator<Item = &ZipEntry> {
        self.entries.values()
    }

    /// Number of entries in the archive
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look an entry up by exact name
    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.entries.get(name)
    }

    /// Insert an entry, replacing any existing entry of the same name.
    ///
    /// Replacement re-appends: the entry lands at the end of the stored
    /// order.
    pub fn set_entry(&mut self, entry: ZipEntry) {
        let name = entry.name().to_string();
        self.entries.shift_remove(&name);
        self.entries.insert(name, entry);
        self.main_header.total_entries = self.entries.len() as u16;
    }

    /// Remove the named entry. Directories take every entry nested under
    /// them along. Unknown names are a no-op.
    pub fn delete_entry(&mut self, name: &str) {
        let dir_prefix = match self.entries.get(name) {
            Some(entry) if entry.is_directory() => Some(entry.name().to_string()),
            Some(_) => None,
            None => return,
        };

        match dir_prefix {
            Some(prefix) => self
                .entries
                .retain(|entry_name, _| !entry_name.starts_with(prefix.as_str())),
            None => {
                self.entries.shift_remove(name);
            }
        }
        self.main_header.total_entries = self.entries.len() as u16;
    }

    /// All entries nested under a directory entry, the directory itself
    /// included by prefix match. Non-directory entries have no children.
    pub fn children_of(&self, entry: &ZipEntry) -> Vec<&ZipEntry> {
        if !entry.is_directory() {
            return Vec::new();
        }
        self.entries
            .values()
            .filter(|child| child.name().starts_with(entry.name()))
            .collect()
    }

    /// Serialize the archive to its canonical byte form.
    ///
    /// Entries are re-sorted by name, case-insensitively and stably (a
    /// visible side effect on the stored order). The output lays out every
    /// entry's compressed payload back to back, then the rebuilt central
    /// directory, then the end record and the archive comment. The end
    /// record's `offset` is the data region length and its `size` the
    /// directory region length.
    ///
    /// Assembling twice without intervening mutation is byte-identical.
    pub fn to_buffer(&mut self) -> Result<Vec<u8>> {
        if self.entries.len() > u16::MAX as usize {
            return Err(MZipError::InvalidFormat(
                "entry count exceeds plain ZIP limits".to_string(),
            ));
        }

        self.entries
            .sort_by(|a_name, _, b_name, _| a_name.to_lowercase().cmp(&b_name.to_lowercase()));

        let mut data = Vec::new();
        let mut directory = Vec::new();
        for entry in self.entries.values_mut() {
            let compressed = entry.compressed_data()?;
            entry.header.offset = data.len() as u32;
            data.extend_from_slice(&compressed);
            directory.extend_from_slice(&entry.pack_header());
        }

        if data.len() > u32::MAX as usize || directory.len() > u32::MAX as usize {
            return Err(MZipError::InvalidFormat(
                "archive exceeds plain ZIP limits".to_string(),
            ));
        }

        self.main_header.disk_entries = self.entries.len() as u16;
        self.main_header.total_entries = self.entries.len() as u16;
        self.main_header.offset = data.len() as u32;
        self.main_header.size = directory.len() as u32;
        self.main_header.comment_length = self.comment.len() as u16;

        let mut out =
            Vec::with_capacity(data.len() + directory.len() + ENDHDR + self.comment.len());
        out.extend_from_slice(&data);
        out.extend_from_slice(&directory);
        out.extend_from_slice(&self.main_header.to_bytes());
        out.extend_from_slice(&self.comment);
        Ok(out)
    }
}
