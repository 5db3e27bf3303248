//! # m-zip: In-Memory ZIP Archive Container
//!
//! `m-zip` manages ZIP archives as plain byte buffers: parse an existing
//! archive's central directory, look entries up by name, add, replace or
//! delete entries, then reassemble the whole archive into one contiguous
//! buffer with recomputed offsets.
//!
//! ## Features
//!
//! - **Whole-buffer model**: one owned buffer in, one owned buffer out
//! - **Name-indexed entries**: a single insertion-ordered table, so the
//!   iteration order and the name index can never disagree
//! - **Directory-aware deletion**: removing `dir/` removes everything under it
//! - **Canonical output**: entries sorted case-insensitively, payload and
//!   directory offsets recomputed on every assembly
//!
//! ## Quick Start
//!
//! ### Reading an archive
//!
//! ```no_run
//! use m_zip::ZipArchive;
//!
//! let archive = ZipArchive::open("archive.zip")?;
//!
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.name(), entry.header().size);
//! }
//!
//! if let Some(entry) = archive.entry("file.txt") {
//!     let content = entry.data()?;
//!     println!("read {} bytes", content.len());
//! }
//! # Ok::<(), m_zip::MZipError>(())
//! ```
//!
//! ### Building an archive in memory
//!
//! ```
//! use m_zip::{CompressionMethod, ZipArchive, ZipEntry};
//!
//! let mut archive = ZipArchive::new();
//! archive.set_entry(ZipEntry::with_data(
//!     "hello.txt",
//!     b"Hello, World!".to_vec(),
//!     CompressionMethod::Deflate,
//! ));
//! archive.set_comment(b"built with m-zip".to_vec());
//!
//! let bytes = archive.to_buffer()?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), m_zip::MZipError>(())
//! ```

pub mod archive;
pub mod entry;
pub mod error;
pub mod headers;

pub use archive::ZipArchive;
pub use entry::{CompressionMethod, ZipEntry};
pub use error::{MZipError, Result};
