//! Archive entry model
//!
//! A `ZipEntry` owns the metadata of one archived item plus its payload
//! source: either a shared range of the buffer the archive was parsed from,
//! or raw uncompressed content for entries added after the fact. Raw content
//! is run through the configured codec when the archive is assembled.

use crate::error::{MZipError, Result};
use crate::headers::{self, EntryHeader, LOC_SIG};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use std::sync::Arc;

/// Compression method to use for ZIP entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// No compression (stored)
    Stored,
    /// DEFLATE compression (most common)
    Deflate,
    /// Zstd compression (requires zstd-support feature)
    #[cfg(feature = "zstd-support")]
    Zstd,
}

impl CompressionMethod {
    pub(crate) fn to_zip_method(self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            #[cfg(feature = "zstd-support")]
            CompressionMethod::Zstd => 93,
        }
    }
}

/// Where an entry's payload bytes live
#[derive(Debug, Clone)]
enum EntryData {
    /// Compressed bytes sit in the buffer the archive was parsed from.
    /// The offset is captured at parse time; the header's offset field is
    /// rewritten on every assembly and cannot be trusted to point here.
    Archived { source: Arc<Vec<u8>>, offset: usize },
    /// Uncompressed content owned by the entry itself
    Raw { content: Vec<u8> },
}

/// One archived item: a file, or a directory marker whose name ends in `/`
#[derive(Debug, Clone)]
pub struct ZipEntry {
    name: String,
    extra: Vec<u8>,
    comment: Vec<u8>,
    pub(crate) header: EntryHeader,
    data: EntryData,
}

impl ZipEntry {
    /// Create an empty file entry compressed with DEFLATE
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_data(name, Vec::new(), CompressionMethod::Deflate)
    }

    /// Create a file entry holding `content`, compressed with `method` on
    /// assembly
    pub fn with_data(name: impl Into<String>, content: Vec<u8>, method: CompressionMethod) -> Self {
        let header = EntryHeader {
            made_by: 20,
            version: 20,
            method: method.to_zip_method(),
            ..EntryHeader::default()
        };
        ZipEntry {
            name: name.into(),
            extra: Vec::new(),
            comment: Vec::new(),
            header,
            data: EntryData::Raw { content },
        }
    }

    /// Create a directory marker entry; a trailing `/` is appended when
    /// missing
    pub fn directory(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with('/') {
            name.push('/');
        }
        Self::with_data(name, Vec::new(), CompressionMethod::Stored)
    }

    /// Entry materialized from an existing archive's central directory
    pub(crate) fn from_archive(
        source: Arc<Vec<u8>>,
        header: EntryHeader,
        name: String,
        extra: Vec<u8>,
        comment: Vec<u8>,
    ) -> Self {
        let offset = header.offset as usize;
        ZipEntry {
            name,
            extra,
            comment,
            header,
            data: EntryData::Archived { source, offset },
        }
    }

    /// Entry name, the unique key within an archive
    pub fn name(&self) -> &str {
        &self.name
    }

    /// An entry is a directory iff its name ends with a path separator
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Fixed central directory fields for this entry
    pub fn header(&self) -> &EntryHeader {
        &self.header
    }

    /// Extra field blob
    pub fn extra(&self) -> &[u8] {
        &self.extra
    }

    pub fn set_extra(&mut self, extra: Vec<u8>) {
        self.extra = extra;
    }

    /// Per-entry comment blob (distinct from the archive comment)
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: Vec<u8>) {
        self.comment = comment;
    }

    /// Replace the payload with raw uncompressed content. The entry stops
    /// referencing its source archive, if any.
    pub fn set_data(&mut self, content: Vec<u8>) {
        self.data = EntryData::Raw { content };
    }

    /// Compressed payload bytes for this entry.
    ///
    /// Entries parsed from an archive yield the recorded range of the source
    /// buffer unchanged, whatever their method. Raw content is compressed
    /// here, and the header's crc and size fields are finalized from it.
    pub fn compressed_data(&mut self) -> Result<Vec<u8>> {
        match &self.data {
            EntryData::Archived { source, offset } => {
                Ok(self.archived_payload(source, *offset)?.to_vec())
            }
            EntryData::Raw { content } => {
                let compressed = compress(content, self.header.method)?;
                self.header.crc = crc32fast::hash(content);
                self.header.size = content.len() as u32;
                self.header.compressed_size = compressed.len() as u32;
                Ok(compressed)
            }
        }
    }

    /// Uncompressed content of this entry
    pub fn data(&self) -> Result<Vec<u8>> {
        match &self.data {
            EntryData::Raw { content } => Ok(content.clone()),
            EntryData::Archived { source, offset } => {
                let compressed = self.archived_payload(source, *offset)?;
                decompress(compressed, self.header.method)
            }
        }
    }

    /// Serialized central directory record: fixed header, name, extra field,
    /// comment. Length fields are synced from the actual blobs first.
    pub fn pack_header(&mut self) -> Vec<u8> {
        self.header.name_length = self.name.len() as u16;
        self.header.extra_length = self.extra.len() as u16;
        self.header.comment_length = self.comment.len() as u16;

        let mut out = self.header.to_bytes();
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(&self.extra);
        out.extend_from_slice(&self.comment);
        out
    }

    /// Slice the compressed payload out of the source buffer.
    ///
    /// Archives written by standard tools put a local file header in front
    /// of the payload; canonical output stores the payload directly at the
    /// recorded offset. Both shapes are accepted.
    fn archived_payload<'a>(&self, source: &'a [u8], offset: usize) -> Result<&'a [u8]> {
        let mut start = offset;
        if has_local_header(source, start) {
            start = headers::local_payload_offset(source, start)?;
        }
        let end = start + self.header.compressed_size as usize;
        if end > source.len() {
            return Err(MZipError::InvalidFormat(format!(
                "entry data out of bounds: {}",
                self.name
            )));
        }
        Ok(&source[start..end])
    }
}

fn has_local_header(buf: &[u8], offset: usize) -> bool {
    offset + 4 <= buf.len()
        && u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
            == LOC_SIG
}

fn compress(content: &[u8], method: u16) -> Result<Vec<u8>> {
    match method {
        0 => Ok(content.to_vec()),
        8 => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(6));
            encoder.write_all(content)?;
            Ok(encoder.finish()?)
        }
        93 => {
            #[cfg(feature = "zstd-support")]
            {
                Ok(zstd::encode_all(content, 3)?)
            }
            #[cfg(not(feature = "zstd-support"))]
            {
                Err(MZipError::UnsupportedCompression(93))
            }
        }
        other => Err(MZipError::UnsupportedCompression(other)),
    }
}

fn decompress(compressed: &[u8], method: u16) -> Result<Vec<u8>> {
    match method {
        0 => Ok(compressed.to_vec()),
        8 => {
            let mut decoder = DeflateDecoder::new(compressed);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            Ok(out)
        }
        93 => {
            #[cfg(feature = "zstd-support")]
            {
                Ok(zstd::decode_all(compressed)?)
            }
            #[cfg(not(feature = "zstd-support"))]
            {
                Err(MZipError::UnsupportedCompression(93))
            }
        }
        other => Err(MZipError::UnsupportedCompression(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_classification_follows_trailing_slash() {
        assert!(ZipEntry::new("docs/").is_directory());
        assert!(!ZipEntry::new("docs/readme.md").is_directory());
        assert!(ZipEntry::directory("docs").is_directory());
    }

    #[test]
    fn raw_content_finalizes_header_on_compression() {
        let content = b"the quick brown fox jumps over the lazy dog".to_vec();
        let mut entry =
            ZipEntry::with_data("fox.txt", content.clone(), CompressionMethod::Stored);
        let compressed = entry.compressed_data().unwrap();

        assert_eq!(compressed, content);
        assert_eq!(entry.header().size, content.len() as u32);
        assert_eq!(entry.header().compressed_size, content.len() as u32);
        assert_eq!(entry.header().crc, crc32fast::hash(&content));
    }

    #[test]
    fn deflate_round_trips_through_the_codec() {
        let content = vec![7u8; 4096];
        let mut entry =
            ZipEntry::with_data("sevens.bin", content.clone(), CompressionMethod::Deflate);
        let compressed = entry.compressed_data().unwrap();

        assert!(compressed.len() < content.len());
        assert_eq!(decompress(&compressed, 8).unwrap(), content);
    }

    #[test]
    fn unknown_method_is_rejected_by_the_codec() {
        assert!(matches!(
            compress(b"x", 12),
            Err(MZipError::UnsupportedCompression(12))
        ));
        assert!(matches!(
            decompress(b"x", 12),
            Err(MZipError::UnsupportedCompression(12))
        ));
    }
}
