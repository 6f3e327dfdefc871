//! Known-answer test vectors
//!
//! Vector files are JSON arrays of
//! `{"outlen": n, "out": hex, "input": hex, "key": hex, "salt": hex, "personal": hex}`.
//! Keyed vectors (any of key, salt or personal non-empty) are skipped.

use crate::config::{HashAlgorithm, HashConfig};
use crate::error::{HashStreamError, IoResultExt, Result};
use crate::hash::HashVerifier;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct VectorRecord {
    outlen: usize,
    out: String,
    input: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    salt: String,
    #[serde(default)]
    personal: String,
}

/// One decoded test vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    /// Digest size in bytes
    pub outlen: usize,
    /// Expected digest
    pub out: Vec<u8>,
    /// Message
    pub input: Vec<u8>,
    /// BLAKE2b key
    pub key: Vec<u8>,
    /// BLAKE2b salt
    pub salt: Vec<u8>,
    /// BLAKE2b personalization
    pub personal: Vec<u8>,
}

/// Result of checking one vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorOutcome {
    /// Digest matched
    Passed,
    /// Digest did not match
    Failed,
    /// Keyed vector, not checked
    Skipped,
}

impl TestVector {
    /// Whether the vector needs a keyed mode
    pub fn is_keyed(&self) -> bool {
        !(self.key.is_empty() && self.salt.is_empty() && self.personal.is_empty())
    }

    /// Verify the expected output through the streaming engine
    pub fn check(&self, algorithm: HashAlgorithm) -> Result<VectorOutcome> {
        if self.is_keyed() {
            return Ok(VectorOutcome::Skipped);
        }
        if self.out.len() != self.outlen {
            return Err(HashStreamError::VectorError(format!(
                "outlen {} does not match {} output bytes",
                self.outlen,
                self.out.len()
            )));
        }

        let verifier = HashVerifier::new(HashConfig::new(algorithm).with_target_size(self.outlen))?;
        let matched = verifier.verify_separate(self.input.iter().copied(), &self.out)?;
        Ok(if matched {
            VectorOutcome::Passed
        } else {
            VectorOutcome::Failed
        })
    }
}

/// Totals over a vector set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorReport {
    /// Vectors that matched
    pub passed: usize,
    /// Keyed vectors
    pub skipped: usize,
    /// Indices of failing vectors
    pub failed: Vec<usize>,
}

impl VectorReport {
    /// No vector failed
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

fn decode(index: usize, field: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value)
        .map_err(|e| HashStreamError::VectorError(format!("vector {index}: bad hex in '{field}': {e}")))
}

/// Parse a JSON vector array
pub fn parse(json: &str) -> Result<Vec<TestVector>> {
    let records: Vec<VectorRecord> =
        serde_json::from_str(json).map_err(|e| HashStreamError::VectorError(e.to_string()))?;

    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            Ok(TestVector {
                outlen: r.outlen,
                out: decode(i, "out", &r.out)?,
                input: decode(i, "input", &r.input)?,
                key: decode(i, "key", &r.key)?,
                salt: decode(i, "salt", &r.salt)?,
                personal: decode(i, "personal", &r.personal)?,
            })
        })
        .collect()
}

/// Load a JSON vector file
pub fn load(path: &Path) -> Result<Vec<TestVector>> {
    let json = std::fs::read_to_string(path).with_path(path)?;
    parse(&json).map_err(|e| e.with_context(format!("loading '{}'", path.display())))
}

/// Check every vector with one algorithm
pub fn check_all(vectors: &[TestVector], algorithm: HashAlgorithm) -> Result<VectorReport> {
    let mut report = VectorReport::default();
    for (i, vector) in vectors.iter().enumerate() {
        match vector.check(algorithm)? {
            VectorOutcome::Passed => report.passed += 1,
            VectorOutcome::Skipped => report.skipped += 1,
            VectorOutcome::Failed => {
                tracing::warn!(index = i, outlen = vector.outlen, "test vector failed");
                report.failed.push(i);
            }
        }
    }
    Ok(report)
}
