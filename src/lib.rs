//! # HashStream - Streaming Digests over Unbounded Byte Streams
//!
//! HashStream computes and verifies SHA-256, SHA-512 and BLAKE2b digests
//! while the data streams through, one byte at a time, without ever holding
//! the whole input in memory.
//!
//! ## Features
//!
//! - **Pull-based hashing**: a [`StreamingHasher`] is an iterator over output units
//! - **Append or separate**: pass the input through followed by its digest, or emit the digest alone
//! - **Output units**: single bytes or fixed-width words (`u16`, `u64`, `[u8; N]`, ...)
//! - **Padded digests**: `0x80 00..` padding rounds the digest to a whole number of units
//! - **Appended digest verification**: the trailing digest is located with a bounded rolling window
//!
//! ## Quick Start
//!
//! ```no_run
//! use hashstream::prelude::*;
//!
//! let config = HashConfig::new(HashAlgorithm::Blake2b).with_target_size(32);
//! let digest = b"hello world".iter().copied().hashed(config)?.collect_bytes()?;
//! assert_eq!(digest.len(), 32);
//! # Ok::<(), hashstream::HashStreamError>(())
//! ```
//!
//! ## Appended Digests
//!
//! ```no_run
//! use hashstream::prelude::*;
//!
//! let config = HashConfig::for_unit_width(8)
//!     .with_algorithm(HashAlgorithm::Sha512)
//!     .with_site(HashSite::Append);
//!
//! let words: Vec<u64> = StreamingHasher::new(vec![1u8; 40], config)?
//!     .units::<u64>()?
//!     .collect::<Result<_>>()?;
//!
//! let verifier = HashVerifier::new(config)?;
//! assert!(verifier.verify_appended_units(words)?);
//! # Ok::<(), hashstream::HashStreamError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod hash;
pub mod source;
pub mod vectors;

// Re-export commonly used types
pub use config::{HashAlgorithm, HashConfig, HashFormat, HashSite};
pub use error::{HashStreamError, Result};
pub use hash::{HashStreamExt, HashVerifier, StreamingHasher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use hashstream::prelude::*;
    //! ```

    pub use crate::config::{HashAlgorithm, HashConfig, HashFormat, HashSite};
    pub use crate::error::{HashStreamError, Result};
    pub use crate::hash::{
        unit_bytes, HashStreamExt, HashVerifier, HasherState, OutputSnapshot, OutputUnit, StreamingHasher, Unit,
    };
    pub use crate::source::{hash_reader, read_bytes, ReadBytes};
}
