//! The streaming hasher
//!
//! [`StreamingHasher`] pulls bytes from a source one at a time, feeds them to
//! the digest in whole blocks and yields output units. With
//! [`HashSite::Append`] the input is passed through before the digest;
//! with [`HashSite::Separate`] only the digest is yielded.
//!
//! ```text
//! Consuming ──(source exhausted: finalize)──▶ Draining ──(digest delivered)──▶ Exhausted
//! ```

use crate::config::{HashConfig, HashFormat, HashSite};
use crate::error::{HashStreamError, Result};
use crate::hash::chunker::Chunker;
use crate::hash::packer::UnitPacker;
use crate::hash::padded::PaddedDigest;
use crate::hash::primitive::{DigestPrimitive, Digester};
use crate::hash::unit::{OutputUnit, Unit};
use crate::hash::verify::HashVerifier;
use crate::hash::window::WindowedSource;
use std::marker::PhantomData;
use tracing::trace;

/// Lifecycle of a hasher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasherState {
    /// Pulling input bytes
    Consuming,
    /// Input finalized, emitting digest bytes
    Draining,
    /// Everything emitted
    Exhausted,
}

#[derive(Debug, Clone)]
enum Source<I> {
    Plain { iter: I, done: bool },
    Windowed(WindowedSource<I>),
}

impl<I: Iterator<Item = u8>> Source<I> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        match self {
            // The producer is never asked again after its first `None`.
            Self::Plain { iter, done } => {
                if *done {
                    return Ok(None);
                }
                let next = iter.next();
                *done = next.is_none();
                Ok(next)
            }
            Self::Windowed(source) => source.next_byte(),
        }
    }
}

#[derive(Debug, Clone)]
enum DigestStage {
    Raw(Digester),
    Padded(PaddedDigest<Digester>),
}

impl DigestStage {
    fn update(&mut self, block: &[u8]) -> Result<()> {
        match self {
            Self::Raw(d) => d.update(block),
            Self::Padded(p) => p.update(block),
        }
    }

    fn finalize(&mut self, tail: &[u8]) -> Result<()> {
        match self {
            Self::Raw(d) => d.finalize(tail),
            Self::Padded(p) => p.finalize(tail),
        }
    }

    /// Final digest bytes; `leading` bytes already sit in the open unit
    fn digest_bytes(&mut self, leading: usize) -> Result<Vec<u8>> {
        let bytes = match self {
            Self::Raw(d) => d.digest().map(<[u8]>::to_vec),
            Self::Padded(p) => {
                p.fit_to_unit_edge(leading)?;
                p.digest_bytes()
            }
        };
        bytes.ok_or_else(|| HashStreamError::config("digest read before finalize"))
    }
}

#[derive(Debug, Clone)]
struct Engine<I> {
    site: HashSite,
    source: Source<I>,
    chunker: Chunker,
    stage: DigestStage,
    packer: UnitPacker,
    state: HasherState,
    digest: Vec<u8>,
    drained: usize,
    consumed: u64,
    emitted: u64,
    last: Option<Unit>,
}

impl<I: Iterator<Item = u8>> Engine<I> {
    fn new(source: Source<I>, config: &HashConfig, digest_size: usize) -> Result<Self> {
        let digester = Digester::new(config.algorithm, digest_size)?;
        let chunker = Chunker::new(digester.block_size());
        let stage = match config.format {
            HashFormat::Raw => DigestStage::Raw(digester),
            HashFormat::Padded => DigestStage::Padded(PaddedDigest::new(digester, config.unit_width)),
        };

        Ok(Self {
            site: config.site,
            source,
            chunker,
            stage,
            packer: UnitPacker::new(config.unit_width),
            state: HasherState::Consuming,
            digest: Vec::new(),
            drained: 0,
            consumed: 0,
            emitted: 0,
            last: None,
        })
    }

    fn next_unit(&mut self) -> Result<Option<Unit>> {
        loop {
            match self.state {
                HasherState::Exhausted => return Ok(None),
                HasherState::Draining => return self.drain_unit(),
                HasherState::Consuming => match self.source.next_byte()? {
                    Some(byte) => {
                        self.consumed += 1;
                        if let Some(block) = self.chunker.push(byte) {
                            self.stage.update(block)?;
                        }
                        if self.site == HashSite::Append {
                            if let Some(unit) = self.packer.push_byte(byte) {
                                return Ok(Some(self.emit(unit)));
                            }
                        }
                    }
                    None => self.begin_draining()?,
                },
            }
        }
    }

    fn begin_draining(&mut self) -> Result<()> {
        let tail = self.chunker.flush_partial();
        self.stage.finalize(tail)?;

        // A unit opened by Append input keeps filling from the digest.
        self.digest = self.stage.digest_bytes(self.packer.pending())?;
        self.drained = 0;
        self.state = HasherState::Draining;

        trace!(
            consumed = self.consumed,
            digest_len = self.digest.len(),
            open_unit = self.packer.pending(),
            "input exhausted, draining digest"
        );
        Ok(())
    }

    fn drain_unit(&mut self) -> Result<Option<Unit>> {
        let total = self.digest.len();
        let available = self.packer.pending() + (total - self.drained);
        if self.drained == total {
            self.packer.finish()?;
            self.state = HasherState::Exhausted;
            return Ok(None);
        }
        if available < self.packer.width() {
            return Err(HashStreamError::InsufficientDigest {
                expected: self.packer.width(),
                available,
                total,
            });
        }

        while self.drained < total {
            let byte = self.digest[self.drained];
            self.drained += 1;
            if let Some(unit) = self.packer.push_byte(byte) {
                if self.drained == total {
                    self.state = HasherState::Exhausted;
                    trace!(units = self.emitted + 1, "digest drained");
                }
                return Ok(Some(self.emit(unit)));
            }
        }

        self.packer.finish()?;
        self.state = HasherState::Exhausted;
        Ok(None)
    }

    fn emit(&mut self, unit: Unit) -> Unit {
        self.emitted += 1;
        self.last = Some(unit.clone());
        unit
    }
}

/// Output already produced by a hasher; cannot hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSnapshot {
    /// Most recent unit emitted
    pub last: Option<Unit>,
    /// Units emitted so far
    pub units_emitted: u64,
    /// Input bytes consumed so far
    pub bytes_consumed: u64,
    /// State at the time of the snapshot, `None` for a detached hasher
    pub state: Option<HasherState>,
}

/// Pull-based hasher over a byte source
///
/// Iterating yields `Result<Unit>`. After the first error the hasher is
/// exhausted.
#[derive(Debug)]
pub struct StreamingHasher<I> {
    config: HashConfig,
    digest_size: usize,
    engine: Option<Engine<I>>,
}

impl<I: Iterator<Item = u8>> StreamingHasher<I> {
    /// Hash everything the source yields
    pub fn new<S>(source: S, config: HashConfig) -> Result<Self>
    where
        S: IntoIterator<Item = u8, IntoIter = I>,
    {
        let digest_size = config.validate()?;
        let source = Source::Plain {
            iter: source.into_iter(),
            done: false,
        };
        Self::with_source(source, config, digest_size)
    }

    /// Hash a stream that ends in its own digest
    ///
    /// The trailing digest is held back in a rolling window and never
    /// hashed. Output is the payload (Append site) followed by the freshly
    /// computed digest; [`claimed_digest`](Self::claimed_digest) holds the
    /// stripped trailer once the payload is exhausted.
    pub fn skipping_trailing_digest<S>(source: S, config: HashConfig) -> Result<Self>
    where
        S: IntoIterator<Item = u8, IntoIter = I>,
    {
        let digest_size = config.validate()?;
        let source = Source::Windowed(WindowedSource::new(
            source.into_iter(),
            config.algorithm,
            digest_size,
            config.unit_width,
            config.format,
        ));
        Self::with_source(source, config, digest_size)
    }

    fn with_source(source: Source<I>, config: HashConfig, digest_size: usize) -> Result<Self> {
        let engine = Engine::new(source, &config, digest_size)?;
        trace!(
            algorithm = config.algorithm.name(),
            digest_size,
            unit_width = config.unit_width,
            format = ?config.format,
            site = ?config.site,
            "hasher created"
        );
        Ok(Self {
            config,
            digest_size,
            engine: Some(engine),
        })
    }

    /// Configuration the hasher was built with
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Unpadded digest size in bytes
    pub fn digest_size(&self) -> usize {
        self.digest_size
    }

    /// Current state, `None` once detached
    pub fn state(&self) -> Option<HasherState> {
        self.engine.as_ref().map(|e| e.state)
    }

    /// Whether the live state was moved out by [`detach`](Self::detach)
    pub fn is_detached(&self) -> bool {
        self.engine.is_none()
    }

    /// Input bytes consumed so far
    pub fn bytes_consumed(&self) -> u64 {
        self.engine.as_ref().map_or(0, |e| e.consumed)
    }

    /// Produce the next output unit
    pub fn next_unit(&mut self) -> Result<Option<Unit>> {
        let engine = self.engine.as_mut().ok_or(HashStreamError::NoHashCapability)?;
        match engine.next_unit() {
            Ok(unit) => Ok(unit),
            Err(e) => {
                engine.state = HasherState::Exhausted;
                Err(e)
            }
        }
    }

    /// Digest bytes (with padding, if any) once the input is finalized
    pub fn computed_digest(&self) -> Option<&[u8]> {
        let engine = self.engine.as_ref()?;
        match engine.state {
            HasherState::Consuming => None,
            _ => Some(&engine.digest),
        }
    }

    /// Trailer stripped from a [`skipping_trailing_digest`](Self::skipping_trailing_digest) source
    pub fn claimed_digest(&self) -> Option<Vec<u8>> {
        match &self.engine.as_ref()?.source {
            Source::Windowed(source) => source.window().claimed_digest(),
            Source::Plain { .. } => None,
        }
    }

    /// The byte producer, `None` once detached
    pub fn source_mut(&mut self) -> Option<&mut I> {
        match &mut self.engine.as_mut()?.source {
            Source::Plain { iter, .. } => Some(iter),
            Source::Windowed(source) => Some(source.get_mut()),
        }
    }

    /// Move the live state into a new hasher
    ///
    /// `self` keeps only its configuration; every further hashing call on
    /// it fails with [`HashStreamError::NoHashCapability`].
    pub fn detach(&mut self) -> Self {
        Self {
            config: self.config,
            digest_size: self.digest_size,
            engine: self.engine.take(),
        }
    }

    /// Record of the output produced so far
    pub fn snapshot(&self) -> OutputSnapshot {
        match &self.engine {
            Some(engine) => OutputSnapshot {
                last: engine.last.clone(),
                units_emitted: engine.emitted,
                bytes_consumed: engine.consumed,
                state: Some(engine.state),
            },
            None => OutputSnapshot {
                last: None,
                units_emitted: 0,
                bytes_consumed: 0,
                state: None,
            },
        }
    }

    /// Typed view of the output units
    pub fn units<U: OutputUnit>(self) -> Result<TypedUnits<I, U>> {
        if U::WIDTH != self.config.unit_width {
            return Err(HashStreamError::config(format!(
                "Output type is {} bytes wide but the hasher emits {}-byte units",
                U::WIDTH,
                self.config.unit_width
            )));
        }
        Ok(TypedUnits {
            inner: self,
            _unit: PhantomData,
        })
    }

    /// Drain the hasher into a flat byte vector
    pub fn collect_bytes(mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(unit) = self.next_unit()? {
            out.extend_from_slice(unit.as_bytes());
        }
        Ok(out)
    }
}

impl<I: Iterator<Item = u8> + Clone> StreamingHasher<I> {
    /// Independent copy of a hasher that has not consumed any input
    pub fn try_clone(&self) -> Result<Self> {
        let engine = self.engine.as_ref().ok_or(HashStreamError::NoHashCapability)?;
        if engine.consumed > 0 || engine.state != HasherState::Consuming {
            return Err(HashStreamError::HashInProgress {
                consumed: engine.consumed,
            });
        }
        Ok(Self {
            config: self.config,
            digest_size: self.digest_size,
            engine: Some(engine.clone()),
        })
    }
}

impl<I: Iterator<Item = u8>> Iterator for StreamingHasher<I> {
    type Item = Result<Unit>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_unit().transpose()
    }
}

/// Output units converted to a fixed-width type
#[derive(Debug)]
pub struct TypedUnits<I, U> {
    inner: StreamingHasher<I>,
    _unit: PhantomData<fn() -> U>,
}

impl<I, U> TypedUnits<I, U> {
    /// Back to the untyped hasher
    pub fn into_inner(self) -> StreamingHasher<I> {
        self.inner
    }
}

impl<I: Iterator<Item = u8>, U: OutputUnit> Iterator for TypedUnits<I, U> {
    type Item = Result<U>;

    fn next(&mut self) -> Option<Self::Item> {
        let unit = self.inner.next_unit().transpose()?;
        Some(unit.map(|u| U::from_stream_bytes(u.as_bytes())))
    }
}

/// Hashing adaptors for byte iterators
pub trait HashStreamExt: Iterator<Item = u8> + Sized {
    /// Hash this stream
    fn hashed(self, config: HashConfig) -> Result<StreamingHasher<Self>> {
        StreamingHasher::new(self, config)
    }

    /// Check that this stream ends in the digest of what precedes it
    fn verify_appended(self, config: HashConfig) -> Result<bool> {
        HashVerifier::new(config)?.verify_appended(self)
    }
}

impl<I: Iterator<Item = u8>> HashStreamExt for I {}
