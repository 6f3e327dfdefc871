//! Quick throughput comparison of the supported algorithms

use crate::config::{HashAlgorithm, HashConfig};
use crate::error::Result;
use crate::hash::hasher::StreamingHasher;
use std::time::{Duration, Instant};

/// Average time and MB/s for one algorithm
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkResult {
    /// Algorithm measured
    pub algorithm: HashAlgorithm,
    /// Average time per pass
    pub duration: Duration,
    /// MB/s
    pub throughput: f64,
}

/// Hash `data_size` bytes through the streaming engine with each algorithm
///
/// Results are sorted fastest first.
pub fn benchmark_algorithms(data_size: usize) -> Result<Vec<BenchmarkResult>> {
    let data: Vec<u8> = (0..data_size).map(|i| (i % 256) as u8).collect();
    let iterations = 10u32;
    let mut results = Vec::new();

    for algorithm in HashAlgorithm::ALL {
        let config = HashConfig::new(algorithm);
        let start = Instant::now();

        for _ in 0..iterations {
            StreamingHasher::new(data.iter().copied(), config)?.collect_bytes()?;
        }

        let duration = start.elapsed() / iterations;
        let throughput = (data_size as f64) / duration.as_secs_f64().max(f64::EPSILON) / (1024.0 * 1024.0);

        tracing::debug!(algorithm = algorithm.name(), ?duration, throughput, "benchmarked");
        results.push(BenchmarkResult {
            algorithm,
            duration,
            throughput,
        });
    }

    results.sort_by(|a, b| a.duration.cmp(&b.duration));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_covers_all_algorithms() {
        let results = benchmark_algorithms(4096).unwrap();
        assert_eq!(results.len(), HashAlgorithm::ALL.len());
        assert!(results.windows(2).all(|w| w[0].duration <= w[1].duration));
        for algorithm in HashAlgorithm::ALL {
            assert!(results.iter().any(|r| r.algorithm == algorithm));
        }
    }
}
