//! Streaming digest engine
//!
//! Bytes are pulled one at a time, buffered into algorithm blocks and
//! emitted as fixed-width output units, either passed through ahead of the
//! digest or replaced by it. Verification covers digests kept separately
//! and digests appended to the stream they protect.

mod bench;
mod chunker;
mod hasher;
mod packer;
mod padded;
mod primitive;
mod unit;
mod verify;
mod window;

pub use bench::{benchmark_algorithms, BenchmarkResult};
pub use chunker::Chunker;
pub use hasher::{HashStreamExt, HasherState, OutputSnapshot, StreamingHasher, TypedUnits};
pub use packer::UnitPacker;
pub use padded::{unpadded_len, PaddedDigest, PAD_MARKER};
pub use primitive::{DigestPrimitive, Digester};
pub use unit::{unit_bytes, OutputUnit, Unit, UnitBytes};
pub use verify::HashVerifier;
pub use window::{Boundary, RollingWindow, WindowState, WindowedSource};
