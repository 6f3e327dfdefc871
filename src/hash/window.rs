//! Rolling window for digests appended to the stream being verified
//!
//! The payload length is unknown until the source ends, so the last
//! `capacity` bytes are held back. A byte is released as payload only once
//! it is older than anything that could still belong to the trailing
//! digest. At end of input the payload/digest boundary is computed once;
//! held payload bytes are then replayed and the rest is the claimed digest.

use crate::config::{HashAlgorithm, HashFormat};
use crate::error::{HashStreamError, Result};
use crate::hash::padded::unpadded_len;

/// Filling or bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// End of input not seen yet
    Filling,
    /// Boundary fixed
    Bounded,
}

/// Payload/digest split of a sealed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    /// Bytes before the boundary (payload)
    pub payload_len: usize,
    /// Total bytes seen
    pub total_len: usize,
}

impl Boundary {
    /// Bytes at or after the boundary (claimed digest)
    pub fn trailer_len(&self) -> usize {
        self.total_len - self.payload_len
    }
}

/// Bounded circular buffer over the tail of a stream
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: Vec<u8>,
    end: usize,
    boundary: Option<Boundary>,
    replay: usize,
}

impl RollingWindow {
    /// Create a window holding the last `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity.max(1)],
            end: 0,
            boundary: None,
            replay: 0,
        }
    }

    /// Window capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Total bytes pushed so far
    pub fn seen(&self) -> usize {
        self.end
    }

    /// Current state
    pub fn state(&self) -> WindowState {
        if self.boundary.is_some() {
            WindowState::Bounded
        } else {
            WindowState::Filling
        }
    }

    /// Boundary, once sealed
    pub fn boundary(&self) -> Option<Boundary> {
        self.boundary
    }

    /// Push one byte; returns the evicted byte once it is certainly payload
    ///
    /// Must not be called after [`seal`](Self::seal).
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        debug_assert!(self.boundary.is_none(), "push after seal");
        let slot = self.end % self.buf.len();
        let evicted = std::mem::replace(&mut self.buf[slot], byte);
        self.end += 1;
        (self.end > self.buf.len()).then_some(evicted)
    }

    /// The last `n` bytes seen (fewer if not available), oldest first
    pub fn tail(&self, n: usize) -> Vec<u8> {
        let n = n.min(self.end).min(self.buf.len());
        (self.end - n..self.end).map(|i| self.buf[i % self.buf.len()]).collect()
    }

    /// Fix the boundary for a trailer of `trailer_len` bytes
    ///
    /// The boundary is rounded down to a multiple of `align`.
    pub fn seal(&mut self, trailer_len: usize, align: usize) -> Result<Boundary> {
        if let Some(boundary) = self.boundary {
            return Ok(boundary);
        }

        if self.end < trailer_len {
            return Err(HashStreamError::TruncatedInput {
                expected: trailer_len,
                available: self.end,
            });
        }

        let align = align.max(1);
        let payload_len = ((self.end - trailer_len) / align) * align;
        let remainder = self.end - payload_len;
        if remainder > self.buf.len() {
            return Err(HashStreamError::WindowCapacity {
                remainder,
                capacity: self.buf.len(),
                unit_width: align,
            });
        }

        let boundary = Boundary {
            payload_len,
            total_len: self.end,
        };
        self.replay = self.end.saturating_sub(self.buf.len());
        self.boundary = Some(boundary);
        tracing::debug!(
            payload = payload_len,
            trailer = remainder,
            "rolling window sealed"
        );
        Ok(boundary)
    }

    /// Next held-back payload byte after sealing
    pub fn next_payload(&mut self) -> Option<u8> {
        let boundary = self.boundary?;
        if self.replay >= boundary.payload_len {
            return None;
        }
        let b = self.buf[self.replay % self.buf.len()];
        self.replay += 1;
        Some(b)
    }

    /// Bytes past the boundary, in stream order
    pub fn claimed_digest(&self) -> Option<Vec<u8>> {
        let boundary = self.boundary?;
        Some(
            (boundary.payload_len..boundary.total_len)
                .map(|i| self.buf[i % self.buf.len()])
                .collect(),
        )
    }
}

/// Byte source that withholds a trailing digest
///
/// Yields only payload bytes. The trailer is `digest_size` bytes for raw
/// digests, or `digest_size` bytes plus its padding for padded digests.
#[derive(Debug, Clone)]
pub struct WindowedSource<I> {
    source: I,
    window: RollingWindow,
    digest_size: usize,
    unit_width: usize,
    format: HashFormat,
}

impl<I: Iterator<Item = u8>> WindowedSource<I> {
    /// Wrap a raw producer
    pub fn new(
        source: I,
        algorithm: HashAlgorithm,
        digest_size: usize,
        unit_width: usize,
        format: HashFormat,
    ) -> Self {
        let capacity = Self::capacity_for(algorithm, unit_width, format);
        Self {
            source,
            window: RollingWindow::new(capacity),
            digest_size,
            unit_width: unit_width.max(1),
            format,
        }
    }

    /// Largest trailer that can follow a payload
    pub fn capacity_for(algorithm: HashAlgorithm, unit_width: usize, format: HashFormat) -> usize {
        match format {
            HashFormat::Raw => algorithm.max_digest_size(),
            HashFormat::Padded => algorithm.max_digest_size() + unit_width.max(1),
        }
    }

    /// The underlying window
    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    /// The wrapped producer
    pub fn get_mut(&mut self) -> &mut I {
        &mut self.source
    }

    /// Next payload byte, `None` at the boundary
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.window.state() == WindowState::Bounded {
            return Ok(self.window.next_payload());
        }

        for byte in self.source.by_ref() {
            if let Some(released) = self.window.push(byte) {
                return Ok(Some(released));
            }
        }

        self.seal()?;
        Ok(self.window.next_payload())
    }

    fn seal(&mut self) -> Result<Boundary> {
        let seen = self.window.seen();
        if seen < self.digest_size {
            return Err(HashStreamError::TruncatedInput {
                expected: self.digest_size,
                available: seen,
            });
        }

        match self.format {
            HashFormat::Raw => self.window.seal(self.digest_size, self.unit_width),
            HashFormat::Padded => {
                // Padding never overlaps the digest and spans at most one unit.
                let span = self.unit_width.min(seen - self.digest_size);
                let tail = self.window.tail(span);
                match unpadded_len(&tail) {
                    Some(marker) => {
                        let pad = tail.len() - marker;
                        self.window.seal(self.digest_size + pad, 1)
                    }
                    None => {
                        tracing::debug!("no padding found before end of input");
                        self.window.seal(self.digest_size, 1)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<I: Iterator<Item = u8>>(source: &mut WindowedSource<I>) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(b) = source.next_byte()? {
            out.push(b);
        }
        Ok(out)
    }

    #[test]
    fn test_release_after_capacity() {
        let mut window = RollingWindow::new(4);
        let released: Vec<Option<u8>> = (0..6u8).map(|b| window.push(b)).collect();
        assert_eq!(released, vec![None, None, None, None, Some(0), Some(1)]);
        assert_eq!(window.tail(4), vec![2, 3, 4, 5]);
        assert_eq!(window.tail(10), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_seal_and_replay() {
        let mut window = RollingWindow::new(4);
        for b in 0..6u8 {
            window.push(b);
        }
        let boundary = window.seal(3, 1).unwrap();
        assert_eq!(boundary, Boundary { payload_len: 3, total_len: 6 });
        assert_eq!(window.state(), WindowState::Bounded);
        assert_eq!(window.next_payload(), Some(2));
        assert_eq!(window.next_payload(), None);
        assert_eq!(window.claimed_digest().unwrap(), vec![3, 4, 5]);
    }

    #[test]
    fn test_seal_rounds_to_alignment() {
        let mut window = RollingWindow::new(16);
        for b in 0..13u8 {
            window.push(b);
        }
        // (13 - 4) rounds down to 8.
        let boundary = window.seal(4, 4).unwrap();
        assert_eq!(boundary.payload_len, 8);
        assert_eq!(boundary.trailer_len(), 5);
    }

    #[test]
    fn test_seal_truncated() {
        let mut window = RollingWindow::new(32);
        for b in 0..10u8 {
            window.push(b);
        }
        assert!(matches!(
            window.seal(32, 1),
            Err(HashStreamError::TruncatedInput { expected: 32, available: 10 })
        ));
    }

    #[test]
    fn test_seal_over_capacity() {
        let mut window = RollingWindow::new(32);
        for b in 0..37u8 {
            window.push(b);
        }
        // floor(5 / 8) * 8 = 0 leaves 37 trailing bytes.
        assert!(matches!(
            window.seal(32, 8),
            Err(HashStreamError::WindowCapacity { remainder: 37, capacity: 32, unit_width: 8 })
        ));
    }

    #[test]
    fn test_windowed_source_raw() {
        let stream: Vec<u8> = (0..100u8).collect();
        let mut source =
            WindowedSource::new(stream.into_iter(), HashAlgorithm::Sha256, 32, 1, HashFormat::Raw);
        assert_eq!(source.window().capacity(), 32);
        let payload = drain(&mut source).unwrap();
        assert_eq!(payload, (0..68u8).collect::<Vec<_>>());
        assert_eq!(source.window().claimed_digest().unwrap(), (68..100u8).collect::<Vec<_>>());
    }

    #[test]
    fn test_windowed_source_short_payload() {
        let stream: Vec<u8> = (0..40u8).collect();
        let mut source =
            WindowedSource::new(stream.into_iter(), HashAlgorithm::Sha512, 32, 1, HashFormat::Raw);
        // Nothing is released before the end: the window is 64 bytes.
        assert_eq!(drain(&mut source).unwrap(), (0..8u8).collect::<Vec<_>>());
    }

    #[test]
    fn test_windowed_source_padded() {
        // 5 payload bytes, 8 digest bytes, 0x80 + 2 zeros closes the 4-byte unit.
        let mut stream = vec![1u8, 2, 3, 4, 5];
        stream.extend([9u8; 8]);
        stream.extend([0x80, 0, 0]);
        let mut source =
            WindowedSource::new(stream.into_iter(), HashAlgorithm::Sha256, 8, 4, HashFormat::Padded);
        assert_eq!(source.window().capacity(), 36);
        assert_eq!(drain(&mut source).unwrap(), vec![1, 2, 3, 4, 5]);
        let claimed = source.window().claimed_digest().unwrap();
        assert_eq!(claimed.len(), 11);
        assert_eq!(&claimed[8..], &[0x80, 0, 0]);
    }

    #[test]
    fn test_windowed_source_truncated() {
        let mut source =
            WindowedSource::new(vec![0u8; 10].into_iter(), HashAlgorithm::Sha256, 32, 1, HashFormat::Raw);
        let err = drain(&mut source).unwrap_err();
        assert!(err.is_truncation());
    }
}
