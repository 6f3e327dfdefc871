//! Digest verification
//!
//! A mismatch is a normal `false` result. Errors are reserved for structural
//! problems such as truncated input or an unsatisfiable configuration.

use crate::config::{HashConfig, HashFormat, HashSite};
use crate::error::Result;
use crate::hash::hasher::StreamingHasher;
use crate::hash::padded::unpadded_len;
use crate::hash::unit::{unit_bytes, OutputUnit};
use tracing::debug;

/// Checks payloads against separate or appended digests
#[derive(Debug, Clone, Copy)]
pub struct HashVerifier {
    config: HashConfig,
    digest_size: usize,
}

impl HashVerifier {
    /// Create a verifier; the config is validated up front
    pub fn new(config: HashConfig) -> Result<Self> {
        let digest_size = config.validate()?;
        Ok(Self { config, digest_size })
    }

    /// Configuration in use
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Verify a payload against a digest supplied as bytes
    ///
    /// With `target_size` left at 0 the digest length determines the target
    /// size, so a truncated prefix of a valid digest still matches. Callers
    /// that need a minimum digest strength must set `target_size`. Padded
    /// digests have their padding stripped first; malformed padding does
    /// not match.
    pub fn verify_separate<S>(&self, payload: S, digest: &[u8]) -> Result<bool>
    where
        S: IntoIterator<Item = u8>,
    {
        let target = match self.config.format {
            HashFormat::Raw => digest.len(),
            HashFormat::Padded => match unpadded_len(digest) {
                Some(len) => len,
                None => {
                    debug!(digest = %hex::encode(digest), "supplied digest has no valid padding");
                    return Ok(false);
                }
            },
        };

        let max = self.config.algorithm.max_digest_size();
        if target == 0 || target > max {
            debug!(target, max, "supplied digest length is not a valid target size");
            return Ok(false);
        }
        if self.config.target_size != 0 && target != self.digest_size {
            debug!(expected = self.digest_size, actual = target, "digest length mismatch");
            return Ok(false);
        }

        let config = self.config.with_site(HashSite::Separate).with_target_size(target);
        if config.validate().is_err() {
            debug!(target, unit_width = config.unit_width, "supplied digest does not fill whole units");
            return Ok(false);
        }

        let computed = StreamingHasher::new(payload, config)?.collect_bytes()?;
        Ok(digests_match(digest, &computed))
    }

    /// Verify a payload against a digest supplied as typed units
    pub fn verify_separate_units<S, D>(&self, payload: S, digest: D) -> Result<bool>
    where
        S: IntoIterator<Item = u8>,
        D: IntoIterator,
        D::Item: OutputUnit,
    {
        let digest: Vec<u8> = unit_bytes(digest).collect();
        self.verify_separate(payload, &digest)
    }

    /// Verify a stream that ends in the digest of everything before it
    pub fn verify_appended<S>(&self, stream: S) -> Result<bool>
    where
        S: IntoIterator<Item = u8>,
    {
        let config = self.config.with_site(HashSite::Append);
        let mut hasher = StreamingHasher::skipping_trailing_digest(stream, config)?;
        while hasher.next_unit()?.is_some() {}

        match (hasher.claimed_digest(), hasher.computed_digest()) {
            (Some(claimed), Some(computed)) => Ok(digests_match(&claimed, computed)),
            _ => Ok(false),
        }
    }

    /// [`verify_appended`](Self::verify_appended) over typed units
    pub fn verify_appended_units<S>(&self, stream: S) -> Result<bool>
    where
        S: IntoIterator,
        S::Item: OutputUnit,
    {
        self.verify_appended(unit_bytes(stream))
    }
}

/// Compare lengths, then bytes
fn digests_match(expected: &[u8], computed: &[u8]) -> bool {
    if expected.len() != computed.len() {
        debug!(
            expected_len = expected.len(),
            computed_len = computed.len(),
            expected = %hex::encode(expected),
            computed = %hex::encode(computed),
            "digest length mismatch"
        );
        return false;
    }

    if expected != computed {
        debug!(
            expected = %hex::encode(expected),
            computed = %hex::encode(computed),
            "digest mismatch"
        );
        return false;
    }

    true
}
