//! Output unit types
//!
//! An output unit is a fixed-width group of consecutive stream bytes. Typed
//! units (`u16`, `u64`, `[u8; N]`, ...) are built from those bytes in
//! little-endian order: the first stream byte is the least significant.

use crate::error::{HashStreamError, Result};

/// A fixed-width value that can be packed from stream bytes
pub trait OutputUnit: Copy {
    /// Width in bytes
    const WIDTH: usize;

    /// Byte representation
    type Bytes: AsRef<[u8]>;

    /// Build a value from exactly `WIDTH` stream bytes
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len() != WIDTH`.
    fn from_stream_bytes(bytes: &[u8]) -> Self;

    /// Stream bytes of this value
    fn to_stream_bytes(&self) -> Self::Bytes;
}

macro_rules! impl_output_unit {
    ($($t:ty),* $(,)?) => {
        $(
            impl OutputUnit for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();
                type Bytes = [u8; std::mem::size_of::<$t>()];

                fn from_stream_bytes(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_le_bytes(buf)
                }

                fn to_stream_bytes(&self) -> Self::Bytes {
                    self.to_le_bytes()
                }
            }
        )*
    };
}

impl_output_unit!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl<const N: usize> OutputUnit for [u8; N] {
    const WIDTH: usize = N;
    type Bytes = [u8; N];

    fn from_stream_bytes(bytes: &[u8]) -> Self {
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        buf
    }

    fn to_stream_bytes(&self) -> Self::Bytes {
        *self
    }
}

/// One emitted output unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Single-byte unit
    Byte(u8),
    /// Multi-byte unit, bytes in stream order
    Wide(Box<[u8]>),
}

impl Unit {
    /// Bytes of this unit in stream order
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Byte(b) => std::slice::from_ref(b),
            Self::Wide(bytes) => bytes,
        }
    }

    /// Width in bytes
    pub fn width(&self) -> usize {
        self.as_bytes().len()
    }

    /// Convert into a typed value of the same width
    pub fn to_value<U: OutputUnit>(&self) -> Result<U> {
        let bytes = self.as_bytes();
        if bytes.len() != U::WIDTH {
            return Err(HashStreamError::config(format!(
                "Output type is {} bytes wide but units are {} bytes",
                U::WIDTH,
                bytes.len()
            )));
        }
        Ok(U::from_stream_bytes(bytes))
    }
}

/// Flattens typed units back into their stream bytes
pub struct UnitBytes<I>
where
    I: Iterator,
    I::Item: OutputUnit,
{
    iter: I,
    current: Option<<I::Item as OutputUnit>::Bytes>,
    pos: usize,
}

impl<I> Iterator for UnitBytes<I>
where
    I: Iterator,
    I::Item: OutputUnit,
{
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            if let Some(bytes) = &self.current {
                if let Some(&b) = bytes.as_ref().get(self.pos) {
                    self.pos += 1;
                    return Some(b);
                }
            }
            self.current = Some(self.iter.next()?.to_stream_bytes());
            self.pos = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self.iter.size_hint();
        let width = <I::Item as OutputUnit>::WIDTH;
        let pending = self
            .current
            .as_ref()
            .map_or(0, |b| b.as_ref().len() - self.pos);
        (
            lo.saturating_mul(width).saturating_add(pending),
            hi.and_then(|h| h.checked_mul(width)?.checked_add(pending)),
        )
    }
}

/// Stream bytes of a sequence of typed units
pub fn unit_bytes<I>(units: I) -> UnitBytes<I::IntoIter>
where
    I: IntoIterator,
    I::Item: OutputUnit,
{
    UnitBytes {
        iter: units.into_iter(),
        current: None,
        pos: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_packing() {
        let v = u32::from_stream_bytes(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(v, 0x0403_0201);
        assert_eq!(v.to_stream_bytes(), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(<[u8; 3]>::WIDTH, 3);
        assert_eq!(i16::WIDTH, 2);
    }

    #[test]
    fn test_unit_bytes_flattening() {
        let bytes: Vec<u8> = unit_bytes([0x0201u16, 0x0403]).collect();
        assert_eq!(bytes, vec![1, 2, 3, 4]);

        let iter = unit_bytes(vec![[9u8, 8, 7]; 2]);
        assert_eq!(iter.size_hint(), (6, Some(6)));
        assert_eq!(iter.collect::<Vec<_>>(), vec![9, 8, 7, 9, 8, 7]);
    }

    #[test]
    fn test_unit_to_value() {
        let unit = Unit::Wide(vec![0xAA, 0xBB].into_boxed_slice());
        assert_eq!(unit.width(), 2);
        assert_eq!(unit.to_value::<u16>().unwrap(), 0xBBAA);
        assert!(unit.to_value::<u32>().is_err());
        assert_eq!(Unit::Byte(7).to_value::<u8>().unwrap(), 7);
        assert_eq!(Unit::Byte(7).as_bytes(), &[7]);
    }
}
