//! Configuration settings for HashStream
//!
//! Defines the hashing parameters (algorithm, output unit width, format,
//! site, digest size), their defaults and validation, and the CLI
//! arguments of the `hashstream` binary.

use crate::error::{HashStreamError, IoResultExt, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// HashStream - streaming digests over byte streams of unknown length
#[derive(Parser, Debug, Clone)]
#[command(name = "hashstream")]
#[command(author = "HashStream Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compute and verify streaming digests (SHA-256, SHA-512, BLAKE2b)")]
#[command(long_about = r#"
HashStream computes a digest while a stream passes through, without
holding the whole input in memory.

The digest is either emitted on its own (separate) or appended to the
passed-through input (append). Appended digests can later be verified
and stripped from the same stream.

Examples:
  hashstream hash file.bin                         # BLAKE2b-512, hex
  hashstream hash file.bin -a sha256 --size 24     # truncated SHA-256
  hashstream hash file.bin --site append --raw > signed.bin
  hashstream verify signed.bin                     # appended digest
  hashstream verify file.bin --digest 256c83b2...  # separate digest
"#)]
pub struct CliArgs {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands of the `hashstream` binary
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Hash a file (or stdin) and write the output units
    #[command(name = "hash")]
    Hash {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,

        /// Hashing options
        #[command(flatten)]
        options: HashOptions,

        /// Write binary output instead of hex
        #[arg(long)]
        raw: bool,
    },

    /// Verify a separate or appended digest
    #[command(name = "verify")]
    Verify {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,

        /// Expected digest as hex; the digest is read from the end of the input when omitted
        #[arg(short, long, value_name = "HEX")]
        digest: Option<String>,

        /// Hashing options
        #[command(flatten)]
        options: HashOptions,
    },

    /// Check a JSON test-vector file
    #[command(name = "vectors")]
    Vectors {
        /// Path to the vector file
        file: PathBuf,

        /// Algorithm the vectors were generated with
        #[arg(short, long, value_enum, default_value = "blake2b")]
        algorithm: HashAlgorithm,
    },

    /// Measure throughput of each algorithm
    #[command(name = "benchmark")]
    Benchmark {
        /// Amount of data to hash (e.g., 10M)
        #[arg(long, default_value = "10M")]
        size: String,
    },
}

/// Hashing options shared by `hash` and `verify`
#[derive(Args, Debug, Clone, Default)]
pub struct HashOptions {
    /// JSON config file; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Digest algorithm
    #[arg(short, long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Digest size in bytes (0 = algorithm maximum)
    #[arg(short, long, value_name = "BYTES")]
    pub size: Option<usize>,

    /// Output unit width in bytes
    #[arg(short = 'w', long, value_name = "BYTES")]
    pub unit_width: Option<usize>,

    /// Digest format
    #[arg(short, long, value_enum)]
    pub format: Option<HashFormat>,

    /// Where the digest goes relative to the input
    #[arg(long, value_enum)]
    pub site: Option<HashSite>,
}

/// Digest algorithm
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256 (32-byte digest, 64-byte blocks)
    #[value(name = "sha256")]
    Sha256,
    /// SHA-512 (64-byte digest, 128-byte blocks)
    #[value(name = "sha512")]
    Sha512,
    /// BLAKE2b (digest up to 64 bytes, 128-byte blocks)
    #[default]
    #[value(name = "blake2b")]
    Blake2b,
}

/// Fixed per-algorithm constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmParams {
    /// Human-readable name
    pub name: &'static str,
    /// Largest digest the algorithm produces
    pub max_digest_size: usize,
    /// Bytes consumed per compression step
    pub block_size: usize,
}

const SHA256_PARAMS: AlgorithmParams = AlgorithmParams {
    name: "SHA256",
    max_digest_size: 32,
    block_size: 64,
};

const SHA512_PARAMS: AlgorithmParams = AlgorithmParams {
    name: "SHA512",
    max_digest_size: 64,
    block_size: 128,
};

// Block size comes from the BLAKE2b implementation itself.
const BLAKE2B_PARAMS: AlgorithmParams = AlgorithmParams {
    name: "BLAKE2B",
    max_digest_size: blake2b_simd::OUTBYTES,
    block_size: blake2b_simd::BLOCKBYTES,
};

impl HashAlgorithm {
    /// All supported algorithms
    pub const ALL: [HashAlgorithm; 3] = [Self::Sha256, Self::Sha512, Self::Blake2b];

    /// Get the constant table entry
    pub fn params(&self) -> &'static AlgorithmParams {
        match self {
            Self::Sha256 => &SHA256_PARAMS,
            Self::Sha512 => &SHA512_PARAMS,
            Self::Blake2b => &BLAKE2B_PARAMS,
        }
    }

    /// Get the maximum digest size in bytes
    pub fn max_digest_size(&self) -> usize {
        self.params().max_digest_size
    }

    /// Get the block size in bytes
    pub fn block_size(&self) -> usize {
        self.params().block_size
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        self.params().name
    }

    /// Resolve a requested digest size; 0 selects the maximum
    pub fn resolve_digest_size(&self, requested: usize) -> Result<usize> {
        let max = self.max_digest_size();
        if requested > max {
            return Err(HashStreamError::DigestSizeTooLarge { requested, max });
        }
        Ok(if requested == 0 { max } else { requested })
    }
}

/// Where the digest is emitted
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashSite {
    /// Input passes through, digest follows it
    Append,
    /// Only the digest is emitted
    #[default]
    Separate,
}

/// How the digest is sized against the output unit width
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashFormat {
    /// Natural digest length
    #[default]
    Raw,
    /// Digest followed by 0x80 and zero bytes up to a unit edge
    Padded,
}

impl HashFormat {
    /// Default format for a unit width: raw for bytes, padded otherwise
    pub fn default_for(unit_width: usize) -> Self {
        if unit_width <= 1 {
            Self::Raw
        } else {
            Self::Padded
        }
    }
}

/// Complete hashing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Digest algorithm
    pub algorithm: HashAlgorithm,
    /// Output unit width in bytes
    pub unit_width: usize,
    /// Raw or padded digest
    pub format: HashFormat,
    /// Append to input or separate
    pub site: HashSite,
    /// Requested digest size (0 = algorithm maximum)
    pub target_size: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Blake2b,
            unit_width: 1,
            format: HashFormat::Raw,
            site: HashSite::Separate,
            target_size: 0,
        }
    }
}

impl HashConfig {
    /// Create a config for the algorithm with every other field defaulted
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Default config for a unit width, picking the matching format
    pub fn for_unit_width(unit_width: usize) -> Self {
        Self {
            unit_width,
            format: HashFormat::default_for(unit_width),
            ..Default::default()
        }
    }

    /// Set the algorithm
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the unit width
    pub fn with_unit_width(mut self, unit_width: usize) -> Self {
        self.unit_width = unit_width;
        self
    }

    /// Set the format
    pub fn with_format(mut self, format: HashFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the site
    pub fn with_site(mut self, site: HashSite) -> Self {
        self.site = site;
        self
    }

    /// Set the requested digest size
    pub fn with_target_size(mut self, target_size: usize) -> Self {
        self.target_size = target_size;
        self
    }

    /// Validate the config and return the effective unpadded digest size
    pub fn validate(&self) -> Result<usize> {
        if self.unit_width == 0 {
            return Err(HashStreamError::InvalidUnitWidth(self.unit_width));
        }

        let digest_size = self.algorithm.resolve_digest_size(self.target_size)?;
        if self.format == HashFormat::Raw && self.unit_width > 1 && digest_size % self.unit_width != 0 {
            return Err(HashStreamError::RawFormatMisaligned {
                digest_size,
                unit_width: self.unit_width,
            });
        }

        Ok(digest_size)
    }

    /// Load a config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_path(path)?;
        serde_json::from_str(&json)
            .map_err(|e| HashStreamError::config(format!("Invalid config '{}': {}", path.display(), e)))
    }

    /// Save the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_path(path)?;
        Ok(())
    }

    /// Create config from CLI options
    pub fn from_cli(options: &HashOptions) -> Result<Self> {
        let mut config = match &options.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(algorithm) = options.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(size) = options.size {
            config.target_size = size;
        }
        if let Some(unit_width) = options.unit_width {
            config.unit_width = unit_width;
            // Without an explicit format or config file, follow the width default.
            if options.format.is_none() && options.config.is_none() {
                config.format = HashFormat::default_for(unit_width);
            }
        }
        if let Some(format) = options.format {
            config.format = format;
        }
        if let Some(site) = options.site {
            config.site = site;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else {
        (size.trim_end_matches('B'), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() || num < 0.0 {
        return Err(format!("Size must be a non-negative number: {}", num_str));
    }

    Ok((num * multiplier as f64) as u64)
}
