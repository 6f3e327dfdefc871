//! Block buffering in front of a digest primitive

/// Accumulates bytes into fixed-size blocks
#[derive(Debug, Clone)]
pub struct Chunker {
    buf: Vec<u8>,
    len: usize,
}

impl Chunker {
    /// Create a chunker for the given block size
    pub fn new(block_size: usize) -> Self {
        Self {
            buf: vec![0u8; block_size.max(1)],
            len: 0,
        }
    }

    /// Block size in bytes
    pub fn block_size(&self) -> usize {
        self.buf.len()
    }

    /// Number of bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.len
    }

    /// Append one byte; returns the block once it is full
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        self.buf[self.len] = byte;
        self.len += 1;
        if self.len == self.buf.len() {
            self.len = 0;
            Some(&self.buf)
        } else {
            None
        }
    }

    /// Take the buffered partial block (0..block_size-1 bytes)
    pub fn flush_partial(&mut self) -> &[u8] {
        let len = std::mem::take(&mut self.len);
        &self.buf[..len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_blocks() {
        let mut chunker = Chunker::new(4);
        let mut blocks = Vec::new();
        for b in 0..10u8 {
            if let Some(block) = chunker.push(b) {
                blocks.push(block.to_vec());
            }
        }
        assert_eq!(blocks, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
        assert_eq!(chunker.buffered(), 2);
        assert_eq!(chunker.flush_partial(), &[8, 9]);
        assert_eq!(chunker.buffered(), 0);
    }

    #[test]
    fn test_exact_multiple_leaves_empty_tail() {
        let mut chunker = Chunker::new(64);
        let full = (0..128).filter(|i| chunker.push(*i as u8).is_some()).count();
        assert_eq!(full, 2);
        assert!(chunker.flush_partial().is_empty());
    }
}
