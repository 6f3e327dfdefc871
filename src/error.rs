//! Error types for HashStream
//!
//! Every structural failure of the engine is a variant here. A digest that
//! simply does not match is never an error; verification reports it as
//! `false`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for HashStream operations
#[derive(Error, Debug)]
pub enum HashStreamError {
    /// Requested digest size exceeds what the algorithm can produce
    #[error("Hash size {requested} is larger than maximum hash size {max}")]
    DigestSizeTooLarge { requested: usize, max: usize },

    /// Raw format with a digest that does not divide into output units
    #[error("Raw hash of {digest_size} bytes cannot be split into {unit_width}-byte output units")]
    RawFormatMisaligned { digest_size: usize, unit_width: usize },

    /// Output units must be at least one byte wide
    #[error("Invalid output unit width: {0}")]
    InvalidUnitWidth(usize),

    /// Padded digest length beyond one unit of padding
    #[error("Length {requested} is larger than maximum padded hash size {max}")]
    PaddingOverflow { requested: usize, max: usize },

    /// Stream ended before a declared digest could be present
    #[error("Truncated data. Expected at least {expected} bytes, only {available} bytes available")]
    TruncatedInput { expected: usize, available: usize },

    /// Stream ended in the middle of an output unit
    #[error("Truncated output unit. Expected {expected} bytes, only {available} bytes available")]
    TruncatedUnit { expected: usize, available: usize },

    /// Remaining digest bytes cannot fill the next output unit
    #[error(
        "Not enough hash data to fill the output value. Expected {expected} bytes, only {available} of {total} hash bytes available"
    )]
    InsufficientDigest {
        expected: usize,
        available: usize,
        total: usize,
    },

    /// Trailing digest does not fit the rolling window
    #[error(
        "Truncated data or bad element size. Cannot fit {remainder} trailing bytes of {unit_width}-byte elements in a {capacity}-byte window"
    )]
    WindowCapacity {
        remainder: usize,
        capacity: usize,
        unit_width: usize,
    },

    /// The hasher was detached and no longer owns digest state
    #[error("Hasher has no hash capability; its state was moved to another owner")]
    NoHashCapability,

    /// Attempt to duplicate a hasher after it consumed input
    #[error("Cannot copy a hasher after hashing has started ({consumed} bytes consumed)")]
    HashInProgress { consumed: u64 },

    /// Digest primitive used after finalize
    #[error("Digest already finalized")]
    AlreadyFinalized,

    /// I/O error while reading a source or writing output
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Test vector parsing error
    #[error("Test vector error: {0}")]
    VectorError(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<HashStreamError>,
    },
}

impl HashStreamError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Strip any context wrappers
    pub fn root(&self) -> &HashStreamError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Raised while building a hasher or padding
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root(),
            Self::DigestSizeTooLarge { .. }
                | Self::RawFormatMisaligned { .. }
                | Self::InvalidUnitWidth(_)
                | Self::PaddingOverflow { .. }
                | Self::ConfigError(_)
        )
    }

    /// Input ended too early
    pub fn is_truncation(&self) -> bool {
        matches!(
            self.root(),
            Self::TruncatedInput { .. } | Self::TruncatedUnit { .. }
        )
    }

    /// Digest bytes could not be laid out in units or in the window
    pub fn is_capacity(&self) -> bool {
        matches!(
            self.root(),
            Self::InsufficientDigest { .. } | Self::WindowCapacity { .. }
        )
    }

    /// Misuse of hasher ownership
    pub fn is_ownership(&self) -> bool {
        matches!(
            self.root(),
            Self::NoHashCapability | Self::HashInProgress { .. } | Self::AlreadyFinalized
        )
    }
}

/// Result type alias for HashStream operations
pub type Result<T> = std::result::Result<T, HashStreamError>;

impl From<std::io::Error> for HashStreamError {
    fn from(err: std::io::Error) -> Self {
        HashStreamError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for HashStreamError {
    fn from(err: serde_json::Error) -> Self {
        HashStreamError::ConfigError(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| HashStreamError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Result<()> = Err(io_err).with_path("/test/path");
        match err.unwrap_err() {
            HashStreamError::Io { path, .. } => assert_eq!(path, PathBuf::from("/test/path")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_classes() {
        assert!(HashStreamError::DigestSizeTooLarge { requested: 65, max: 64 }.is_configuration());
        assert!(HashStreamError::TruncatedInput { expected: 32, available: 3 }.is_truncation());
        assert!(HashStreamError::WindowCapacity {
            remainder: 70,
            capacity: 64,
            unit_width: 8
        }
        .is_capacity());
        assert!(HashStreamError::NoHashCapability.is_ownership());
        assert!(!HashStreamError::NoHashCapability.is_truncation());
    }

    #[test]
    fn test_context_keeps_class() {
        let err = HashStreamError::TruncatedUnit { expected: 8, available: 3 }.with_context("hashing stdin");
        assert!(err.is_truncation());
        assert!(err.to_string().starts_with("hashing stdin: "));
    }

    #[test]
    fn test_capacity_message_has_counts() {
        let err = HashStreamError::InsufficientDigest {
            expected: 8,
            available: 4,
            total: 28,
        };
        let msg = err.to_string();
        assert!(msg.contains("Expected 8 bytes"));
        assert!(msg.contains("only 4 of 28"));
    }
}
