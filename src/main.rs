//! HashStream CLI - streaming digests for files and pipes
//!
//! Hashes or verifies a file (or stdin) without loading it into memory.

use clap::Parser;
use hashstream::config::{parse_size, CliArgs, Commands, HashAlgorithm, HashConfig, HashOptions, HashSite};
use hashstream::error::{HashStreamError, IoResultExt, Result};
use hashstream::hash::{benchmark_algorithms, HashVerifier};
use hashstream::source::{hash_reader, read_bytes, ReadBytes};
use hashstream::vectors;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Parse CLI arguments
    let args = CliArgs::parse();

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the command ran but its check failed
fn run(args: CliArgs) -> Result<bool> {
    match &args.command {
        Commands::Hash { input, options, raw } => cmd_hash(input.as_deref(), options, *raw, args.verbose),
        Commands::Verify { input, digest, options } => {
            cmd_verify(input.as_deref(), digest.as_deref(), options, args.verbose)
        }
        Commands::Vectors { file, algorithm } => cmd_vectors(file, *algorithm),
        Commands::Benchmark { size } => cmd_benchmark(size),
    }
}

fn open_input(input: Option<&Path>) -> Result<ReadBytes<Box<dyn Read>>> {
    match input {
        Some(path) => {
            let file = File::open(path).with_path(path)?;
            Ok(read_bytes(Box::new(file) as Box<dyn Read>, path))
        }
        None => Ok(read_bytes(Box::new(std::io::stdin().lock()) as Box<dyn Read>, "<stdin>")),
    }
}

fn print_config(config: &HashConfig, digest_size: usize) {
    eprintln!("Algorithm:   {}", config.algorithm.name());
    eprintln!("Digest size: {} bytes", digest_size);
    eprintln!("Unit width:  {} bytes", config.unit_width);
    eprintln!("Format:      {:?}", config.format);
    eprintln!("Site:        {:?}", config.site);
}

fn cmd_hash(input: Option<&Path>, options: &HashOptions, raw: bool, verbose: u8) -> Result<bool> {
    let config = HashConfig::from_cli(options)?;
    if verbose > 0 {
        print_config(&config, config.validate()?);
    }

    let mut source = open_input(input)?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let written = hash_reader(&mut source, config, |unit| {
        if raw {
            out.write_all(unit.as_bytes()).with_path("<stdout>")
        } else {
            write!(out, "{}", hex::encode(unit.as_bytes())).with_path("<stdout>")
        }
    })?;

    if !raw {
        writeln!(out).with_path("<stdout>")?;
    }
    out.flush().with_path("<stdout>")?;

    tracing::debug!(bytes = written, "output written");
    Ok(true)
}

fn cmd_verify(input: Option<&Path>, digest: Option<&str>, options: &HashOptions, verbose: u8) -> Result<bool> {
    let mut config = HashConfig::from_cli(options)?;
    if digest.is_none() {
        config.site = HashSite::Append;
    }
    if verbose > 0 {
        print_config(&config, config.validate()?);
    }

    let verifier = HashVerifier::new(config)?;
    let mut source = open_input(input)?;

    let expected = digest
        .map(|hex_digest| hex::decode(hex_digest.trim()))
        .transpose()
        .map_err(|e| HashStreamError::config(format!("Invalid hex digest: {}", e)))?;

    let matches = source.checked(|bytes| match &expected {
        Some(expected) => verifier.verify_separate(bytes.by_ref(), expected),
        None => verifier.verify_appended(bytes.by_ref()),
    })?;

    println!("Match: {}", if matches { "YES ✓" } else { "NO ✗" });
    Ok(matches)
}

fn cmd_vectors(file: &Path, algorithm: HashAlgorithm) -> Result<bool> {
    let test_vectors = vectors::load(file)?;
    let report = vectors::check_all(&test_vectors, algorithm)?;

    println!("Algorithm: {}", algorithm.name());
    println!("Vectors:   {}", test_vectors.len());
    println!("Passed:    {}", report.passed);
    println!("Skipped:   {} (keyed)", report.skipped);
    println!("Failed:    {}", report.failed.len());
    for index in &report.failed {
        println!("  vector #{}", index);
    }

    Ok(report.all_passed())
}

fn cmd_benchmark(size: &str) -> Result<bool> {
    let data_size = parse_size(size).map_err(HashStreamError::ConfigError)? as usize;

    println!("Hashing {} bytes through the streaming engine...\n", data_size);
    for result in benchmark_algorithms(data_size)? {
        println!(
            "{:12} {:>10.2?}  {:>8.1} MB/s",
            result.algorithm.name(),
            result.duration,
            result.throughput
        );
    }

    Ok(true)
}
