//! Error types for m-zip

use std::io;

/// Result type for m-zip operations
pub type Result<T> = std::result::Result<T, MZipError>;

/// Error types that can occur while working with an archive
#[derive(Debug)]
pub enum MZipError {
    /// I/O error
    Io(io::Error),
    /// Invalid ZIP format or structure
    InvalidFormat(String),
    /// Unsupported compression method
    UnsupportedCompression(u16),
}

impl std::fmt::Display for MZipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MZipError::Io(e) => write!(f, "I/O error: {}", e),
            MZipError::InvalidFormat(msg) => write!(f, "Invalid ZIP format: {}", msg),
            MZipError::UnsupportedCompression(method) => {
                write!(f, "Unsupported compression method: {}", method)
            }
        }
    }
}

impl std::error::Error for MZipError {}

impl From<io::Error> for MZipError {
    fn from(err: io::Error) -> Self {
        MZipError::Io(err)
    }
}
