//! Digest padding to an output unit edge
//!
//! A padded digest is the inner digest followed by `0x80` and as many `0x00`
//! bytes as needed. The padded length is chosen only after all input has
//! been seen, between one extra byte and one full unit of extra bytes.

use crate::config::HashAlgorithm;
use crate::error::{HashStreamError, Result};
use crate::hash::primitive::DigestPrimitive;

/// First padding byte
pub const PAD_MARKER: u8 = 0x80;

/// Decorator extending a digest with bit-style padding
#[derive(Debug, Clone)]
pub struct PaddedDigest<D> {
    inner: D,
    unit_width: usize,
    usable_size: usize,
}

impl<D: DigestPrimitive> PaddedDigest<D> {
    /// Wrap a primitive; the usable size starts at one byte of padding
    pub fn new(inner: D, unit_width: usize) -> Self {
        let usable_size = inner.target_size() + 1;
        Self {
            inner,
            unit_width,
            usable_size,
        }
    }

    /// Digest length including padding
    pub fn usable_size(&self) -> usize {
        self.usable_size
    }

    /// Largest allowed padded length
    pub fn max_usable_size(&self) -> usize {
        self.inner.target_size() + self.unit_width
    }

    /// Unpadded digest length
    pub fn target_size(&self) -> usize {
        self.inner.target_size()
    }

    /// Set the padded length
    pub fn set_usable_size(&mut self, n: usize) -> Result<()> {
        let max = self.max_usable_size();
        if n > max {
            return Err(HashStreamError::PaddingOverflow { requested: n, max });
        }
        self.usable_size = n;
        Ok(())
    }

    /// Pick the padded length that ends on a unit edge after `leading` bytes
    ///
    /// `leading` counts bytes already placed in the current output unit.
    /// Always adds at least one padding byte.
    pub fn fit_to_unit_edge(&mut self, leading: usize) -> Result<usize> {
        let w = self.unit_width.max(1);
        let pad = w - ((leading + self.inner.target_size()) % w);
        self.set_usable_size(self.inner.target_size() + pad)?;
        Ok(self.usable_size)
    }

    /// Forward one full block
    pub fn update(&mut self, block: &[u8]) -> Result<()> {
        self.inner.update(block)
    }

    /// Finalize the inner primitive
    pub fn finalize(&mut self, tail: &[u8]) -> Result<()> {
        self.inner.finalize(tail)
    }

    /// Algorithm of the inner primitive
    pub fn algorithm(&self) -> HashAlgorithm {
        self.inner.algorithm()
    }

    /// Inner digest followed by padding, once finalized
    pub fn digest_bytes(&self) -> Option<Vec<u8>> {
        let digest = self.inner.digest()?;
        let pad_len = self.usable_size.saturating_sub(digest.len());

        let mut out = Vec::with_capacity(digest.len() + pad_len);
        out.extend_from_slice(digest);
        out.extend((0..pad_len).map(|i| if i == 0 { PAD_MARKER } else { 0x00 }));
        Some(out)
    }
}

/// Length of a padded digest with its padding removed
///
/// The padding is a final `0x80` followed only by `0x00` bytes. Returns
/// `None` when no such padding exists.
pub fn unpadded_len(padded: &[u8]) -> Option<usize> {
    let marker = padded.iter().rposition(|&b| b != 0x00)?;
    (padded[marker] == PAD_MARKER).then_some(marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::primitive::Digester;

    fn padded(target: usize, unit_width: usize) -> PaddedDigest<Digester> {
        let digester = Digester::new(HashAlgorithm::Sha256, target).unwrap();
        PaddedDigest::new(digester, unit_width)
    }

    #[test]
    fn test_default_usable_size() {
        let p = padded(24, 8);
        assert_eq!(p.usable_size(), 25);
        assert_eq!(p.max_usable_size(), 32);
    }

    #[test]
    fn test_set_usable_size_bounds() {
        let mut p = padded(24, 8);
        p.set_usable_size(32).unwrap();
        assert!(matches!(
            p.set_usable_size(33),
            Err(HashStreamError::PaddingOverflow { requested: 33, max: 32 })
        ));
        assert_eq!(p.usable_size(), 32);
    }

    #[test]
    fn test_digest_bytes_padding() {
        let mut p = padded(20, 8);
        p.finalize(b"abc").unwrap();
        assert_eq!(p.fit_to_unit_edge(0).unwrap(), 24);

        let bytes = p.digest_bytes().unwrap();
        let plain = Digester::digest_bytes(HashAlgorithm::Sha256, 20, b"abc").unwrap();
        assert_eq!(&bytes[..20], &plain[..]);
        assert_eq!(&bytes[20..], &[0x80, 0, 0, 0]);
    }

    #[test]
    fn test_aligned_digest_gets_full_unit() {
        let mut p = padded(24, 8);
        p.finalize(b"").unwrap();
        assert_eq!(p.fit_to_unit_edge(0).unwrap(), 32);
        assert_eq!(&p.digest_bytes().unwrap()[24..], &[0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_leading_bytes_shift_padding() {
        let mut p = padded(24, 8);
        p.finalize(b"").unwrap();
        // Three payload bytes already sit in the open unit.
        assert_eq!(p.fit_to_unit_edge(3).unwrap(), 29);
        assert_eq!((3 + p.usable_size()) % 8, 0);
    }

    #[test]
    fn test_not_finalized() {
        assert!(padded(32, 4).digest_bytes().is_none());
    }

    #[test]
    fn test_unpadded_len() {
        assert_eq!(unpadded_len(&[1, 2, 3, 0x80, 0, 0]), Some(3));
        assert_eq!(unpadded_len(&[1, 2, 3, 0x80]), Some(3));
        assert_eq!(unpadded_len(&[0x80, 0x80, 0]), Some(1));
        assert_eq!(unpadded_len(&[1, 2, 3, 0]), None);
        assert_eq!(unpadded_len(&[0, 0]), None);
        assert_eq!(unpadded_len(&[]), None);
    }
}
