//! Digest primitives
//!
//! Wraps SHA-256, SHA-512 (`sha2`) and BLAKE2b (`blake2b_simd`) behind the
//! block-wise `update`/`finalize` contract the streaming engine drives.

use crate::config::HashAlgorithm;
use crate::error::{HashStreamError, Result};
use sha2::Digest;

/// Block-wise digest contract used by the streaming engine
pub trait DigestPrimitive {
    /// Algorithm behind this primitive
    fn algorithm(&self) -> HashAlgorithm;

    /// Number of digest bytes this instance produces
    fn target_size(&self) -> usize;

    /// Feed one full block
    fn update(&mut self, block: &[u8]) -> Result<()>;

    /// Feed the final partial block and compute the digest
    fn finalize(&mut self, tail: &[u8]) -> Result<()>;

    /// The first `target_size` digest bytes, once finalized
    fn digest(&self) -> Option<&[u8]>;

    /// Bytes per compression step
    fn block_size(&self) -> usize {
        self.algorithm().block_size()
    }

    /// Largest digest the algorithm produces
    fn max_digest_size(&self) -> usize {
        self.algorithm().max_digest_size()
    }
}

#[derive(Clone)]
enum DigestState {
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
    Blake2b(blake2b_simd::State),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm, target_size: usize) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Sha512 => Self::Sha512(sha2::Sha512::new()),
            // BLAKE2b commits to its output length up front.
            HashAlgorithm::Blake2b => Self::Blake2b(
                blake2b_simd::Params::new()
                    .hash_length(target_size)
                    .to_state(),
            ),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Blake2b(h) => {
                h.update(data);
            }
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
            Self::Blake2b(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}

/// Concrete digest primitive for every supported algorithm
#[derive(Clone)]
pub struct Digester {
    algorithm: HashAlgorithm,
    target_size: usize,
    state: Option<DigestState>,
    digest: Vec<u8>,
}

impl Digester {
    /// Create a digester; a target size of 0 selects the maximum
    pub fn new(algorithm: HashAlgorithm, target_size: usize) -> Result<Self> {
        let target_size = algorithm.resolve_digest_size(target_size)?;
        Ok(Self {
            algorithm,
            target_size,
            state: Some(DigestState::new(algorithm, target_size)),
            digest: Vec::new(),
        })
    }

    /// Digest a complete buffer in one call
    pub fn digest_bytes(algorithm: HashAlgorithm, target_size: usize, data: &[u8]) -> Result<Vec<u8>> {
        let mut digester = Self::new(algorithm, target_size)?;
        digester.finalize(data)?;
        Ok(digester.digest)
    }

    /// Whether `finalize` has run
    pub fn is_finalized(&self) -> bool {
        self.state.is_none()
    }
}

impl DigestPrimitive for Digester {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn target_size(&self) -> usize {
        self.target_size
    }

    fn update(&mut self, block: &[u8]) -> Result<()> {
        let state = self.state.as_mut().ok_or(HashStreamError::AlreadyFinalized)?;
        state.update(block);
        Ok(())
    }

    fn finalize(&mut self, tail: &[u8]) -> Result<()> {
        let mut state = self.state.take().ok_or(HashStreamError::AlreadyFinalized)?;
        if !tail.is_empty() {
            state.update(tail);
        }

        let mut digest = state.finalize();
        // SHA-2 digests are truncated to the requested size.
        digest.truncate(self.target_size);
        self.digest = digest;
        Ok(())
    }

    fn digest(&self) -> Option<&[u8]> {
        if self.is_finalized() {
            Some(&self.digest)
        } else {
            None
        }
    }
}

impl std::fmt::Debug for Digester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digester")
            .field("algorithm", &self.algorithm)
            .field("target_size", &self.target_size)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}
