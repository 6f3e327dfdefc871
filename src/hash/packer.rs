//! Packing a byte stream into output units

use crate::error::{HashStreamError, Result};
use crate::hash::unit::Unit;

/// Converts bytes into fixed-width units, keeping a partial unit between pushes
#[derive(Debug, Clone)]
pub enum UnitPacker {
    /// One-byte units: every byte is a unit, nothing is buffered
    Single,
    /// Wider units assembled in a small buffer
    Multi {
        /// Unit width in bytes
        width: usize,
        /// Bytes of the unit being assembled
        buf: Vec<u8>,
    },
}

impl UnitPacker {
    /// Create a packer for the given unit width
    pub fn new(width: usize) -> Self {
        if width <= 1 {
            Self::Single
        } else {
            Self::Multi {
                width,
                buf: Vec::with_capacity(width),
            }
        }
    }

    /// Unit width in bytes
    pub fn width(&self) -> usize {
        match self {
            Self::Single => 1,
            Self::Multi { width, .. } => *width,
        }
    }

    /// Bytes held in the open unit
    pub fn pending(&self) -> usize {
        match self {
            Self::Single => 0,
            Self::Multi { buf, .. } => buf.len(),
        }
    }

    /// Bytes still needed to close the open unit (0 when none is open)
    pub fn missing(&self) -> usize {
        match self.pending() {
            0 => 0,
            n => self.width() - n,
        }
    }

    /// Push one byte; returns a unit once complete
    pub fn push_byte(&mut self, byte: u8) -> Option<Unit> {
        match self {
            Self::Single => Some(Unit::Byte(byte)),
            Self::Multi { width, buf } => {
                buf.push(byte);
                if buf.len() == *width {
                    let unit = std::mem::replace(buf, Vec::with_capacity(*width));
                    Some(Unit::Wide(unit.into_boxed_slice()))
                } else {
                    None
                }
            }
        }
    }

    /// Fail if the stream ended with an open unit
    pub fn finish(&self) -> Result<()> {
        match self.pending() {
            0 => Ok(()),
            available => Err(HashStreamError::TruncatedUnit {
                expected: self.width(),
                available,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_passthrough() {
        let mut packer = UnitPacker::new(1);
        assert_eq!(packer.push_byte(42), Some(Unit::Byte(42)));
        assert_eq!(packer.pending(), 0);
        assert!(packer.finish().is_ok());
    }

    #[test]
    fn test_multi_byte_units() {
        let mut packer = UnitPacker::new(3);
        let units: Vec<Unit> = (1..=7u8).filter_map(|b| packer.push_byte(b)).collect();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].as_bytes(), &[1, 2, 3]);
        assert_eq!(units[1].as_bytes(), &[4, 5, 6]);
        assert_eq!(packer.pending(), 1);
        assert_eq!(packer.missing(), 2);
    }

    #[test]
    fn test_truncated_unit() {
        let mut packer = UnitPacker::new(8);
        for b in 0..5 {
            packer.push_byte(b);
        }
        assert!(matches!(
            packer.finish(),
            Err(HashStreamError::TruncatedUnit { expected: 8, available: 5 })
        ));
    }
}
