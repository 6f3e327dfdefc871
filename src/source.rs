//! Byte sources over `std::io::Read`
//!
//! The engine pulls bytes from a plain iterator, which cannot fail. A read
//! error ends the stream early and is kept aside. [`hash_reader`] and
//! [`ReadBytes::checked`] raise it before any result built on the short
//! input escapes.

use crate::config::HashConfig;
use crate::error::{HashStreamError, Result};
use crate::hash::{HasherState, StreamingHasher, Unit};
use std::io::{ErrorKind, Read};
use std::path::PathBuf;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Buffered byte iterator over a reader
pub struct ReadBytes<R> {
    reader: R,
    path: PathBuf,
    buf: Box<[u8]>,
    pos: usize,
    len: usize,
    error: Option<std::io::Error>,
    done: bool,
}

impl<R: Read> ReadBytes<R> {
    /// Wrap a reader; `path` labels I/O errors
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            buf: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            len: 0,
            error: None,
            done: false,
        }
    }

    /// The error that ended the stream, if any
    pub fn take_error(&mut self) -> Result<()> {
        match self.error.take() {
            Some(source) => Err(HashStreamError::io(self.path.clone(), source)),
            None => Ok(()),
        }
    }

    /// Run `check` over the bytes; a read error takes precedence over its outcome
    pub fn checked<T>(&mut self, check: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let outcome = check(self);
        self.take_error()?;
        outcome
    }

    fn fill(&mut self) -> bool {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return false,
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return true;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "read failed");
                    self.error = Some(e);
                    return false;
                }
            }
        }
    }
}

impl<R: Read> Iterator for ReadBytes<R> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.done {
            return None;
        }
        if self.pos == self.len && !self.fill() {
            self.done = true;
            return None;
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Some(b)
    }
}

/// Iterate over the bytes of a reader
pub fn read_bytes<R: Read>(reader: R, path: impl Into<PathBuf>) -> ReadBytes<R> {
    ReadBytes::new(reader, path)
}

/// Hash a reader, handing each output unit to `sink`
///
/// Once the input ends the read error, if any, is raised before the first
/// unit holding digest bytes reaches `sink`. Returns the bytes handed out.
pub fn hash_reader<R, F>(source: &mut ReadBytes<R>, config: HashConfig, mut sink: F) -> Result<u64>
where
    R: Read,
    F: FnMut(&Unit) -> Result<()>,
{
    let mut hasher = StreamingHasher::new(source.by_ref(), config)?;
    let mut written = 0u64;

    loop {
        let next = hasher.next_unit();
        if hasher.state() != Some(HasherState::Consuming) {
            if let Some(bytes) = hasher.source_mut() {
                bytes.take_error()?;
            }
        }
        match next? {
            Some(unit) => {
                sink(&unit)?;
                written += unit.width() as u64;
            }
            None => return Ok(written),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HashAlgorithm, HashSite};
    use crate::hash::HashVerifier;
    use std::io::Cursor;

    struct FailAfter {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(std::io::Error::new(ErrorKind::BrokenPipe, "gone")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_reads_all_bytes() {
        let data: Vec<u8> = (0..200_000u32).map(|i| i as u8).collect();
        let mut bytes = read_bytes(Cursor::new(data.clone()), "mem");
        assert_eq!(bytes.by_ref().collect::<Vec<_>>(), data);
        assert!(bytes.take_error().is_ok());
        assert_eq!(bytes.next(), None);
    }

    #[test]
    fn test_error_is_deferred() {
        let mut bytes = read_bytes(
            FailAfter {
                data: Cursor::new(vec![1, 2, 3]),
            },
            "pipe",
        );
        assert_eq!(bytes.by_ref().collect::<Vec<_>>(), vec![1, 2, 3]);
        match bytes.take_error().unwrap_err() {
            HashStreamError::Io { path, .. } => assert_eq!(path, PathBuf::from("pipe")),
            other => panic!("unexpected error: {other}"),
        }
    }

    fn failing(data: Vec<u8>) -> ReadBytes<FailAfter> {
        read_bytes(FailAfter { data: Cursor::new(data) }, "pipe")
    }

    #[test]
    fn test_hash_reader_matches_engine() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();
        let config = HashConfig::new(HashAlgorithm::Sha512).with_site(HashSite::Append);
        let mut out = Vec::new();
        let mut bytes = read_bytes(Cursor::new(data.clone()), "mem");
        let written = hash_reader(&mut bytes, config, |unit| {
            out.extend_from_slice(unit.as_bytes());
            Ok(())
        })
        .unwrap();

        let expected = StreamingHasher::new(data, config).unwrap().collect_bytes().unwrap();
        assert_eq!(out, expected);
        assert_eq!(written, expected.len() as u64);
    }

    #[test]
    fn test_read_error_withholds_separate_digest() {
        let mut units = 0;
        let err = hash_reader(&mut failing(vec![1, 2, 3]), HashConfig::new(HashAlgorithm::Sha256), |_| {
            units += 1;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, HashStreamError::Io { .. }));
        assert_eq!(units, 0);
    }

    #[test]
    fn test_read_error_withholds_appended_digest() {
        let config = HashConfig::new(HashAlgorithm::Blake2b).with_site(HashSite::Append);
        let mut out = Vec::new();
        let err = hash_reader(&mut failing(b"partial".to_vec()), config, |unit| {
            out.extend_from_slice(unit.as_bytes());
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, HashStreamError::Io { .. }));
        assert_eq!(out, b"partial");
    }

    #[test]
    fn test_checked_prefers_read_error() {
        // Three bytes cannot hold a digest, but the read error is the cause.
        let config = HashConfig::new(HashAlgorithm::Sha256).with_site(HashSite::Append);
        let verifier = HashVerifier::new(config).unwrap();
        let err = failing(vec![1, 2, 3])
            .checked(|bytes| verifier.verify_appended(bytes.by_ref()))
            .unwrap_err();
        assert!(matches!(err, HashStreamError::Io { .. }));

        let mut clean = read_bytes(Cursor::new(vec![1, 2, 3]), "mem");
        let err = clean.checked(|bytes| verifier.verify_appended(bytes.by_ref())).unwrap_err();
        assert!(err.is_truncation());
    }
}
