//! Performance benchmarks for HashStream
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hashstream::config::{HashAlgorithm, HashConfig, HashSite};
use hashstream::hash::{HashVerifier, StreamingHasher};

const DATA_SIZE: usize = 4 * 1024 * 1024;

fn test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

fn drain(data: &[u8], config: HashConfig) -> usize {
    let hasher = StreamingHasher::new(data.iter().copied(), config).unwrap();
    hasher.map(|unit| unit.unwrap().width()).sum()
}

fn bench_hash_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_algorithms");
    let data = test_data(DATA_SIZE);

    group.throughput(Throughput::Bytes(DATA_SIZE as u64));

    for algorithm in HashAlgorithm::ALL {
        let config = HashConfig::new(algorithm);
        group.bench_with_input(BenchmarkId::new("separate", algorithm.name()), &data, |b, data| {
            b.iter(|| black_box(drain(data, config)));
        });
    }

    group.finish();
}

fn bench_unit_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit_widths");
    let data = test_data(DATA_SIZE);

    group.throughput(Throughput::Bytes(DATA_SIZE as u64));

    for width in [1usize, 2, 8, 16] {
        let config = HashConfig::for_unit_width(width)
            .with_algorithm(HashAlgorithm::Blake2b)
            .with_site(HashSite::Append);
        group.bench_with_input(BenchmarkId::new("append", width), &data, |b, data| {
            b.iter(|| black_box(drain(data, config)));
        });
    }

    group.finish();
}

fn bench_verify_appended(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify_appended");

    for algorithm in HashAlgorithm::ALL {
        let config = HashConfig::for_unit_width(8)
            .with_algorithm(algorithm)
            .with_site(HashSite::Append);
        let stream = StreamingHasher::new(test_data(DATA_SIZE), config)
            .unwrap()
            .collect_bytes()
            .unwrap();
        let verifier = HashVerifier::new(config).unwrap();

        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::new("window", algorithm.name()), &stream, |b, stream| {
            b.iter(|| black_box(verifier.verify_appended(stream.iter().copied()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hash_algorithms, bench_unit_widths, bench_verify_appended);

criterion_main!(benches);
