//! Micro-benchmarks comparing the multiplication strategies.

use std::sync::Arc;
use std::time::Duration;

use matcalc_core::buffer::Matrix;
use matcalc_core::elementwise::SerialElementwise;
use matcalc_core::multiplier::CoreMultiplier;
use matcalc_core::naive::NaiveCore;
use matcalc_core::observers::NoOpObserver;
use matcalc_core::options::Options;
use matcalc_core::parallel::ParallelStrassenCore;
use matcalc_core::progress::CancellationToken;
use matcalc_core::strassen::StrassenCore;

use crate::runner::{benchmark, benchmark_detailed};

/// Base-case threshold used while benchmarking the recursive engines, so
/// that even the smallest measured sizes actually recurse.
const BENCH_BASE_THRESHOLD: usize = 8;

/// Result of comparing naive vs Strassen at a specific size.
#[derive(Debug, Clone)]
pub struct CrossoverPoint {
    pub size: usize,
    pub naive_ns: u64,
    pub strassen_ns: u64,
    pub strassen_is_faster: bool,
}

/// Result of measuring parallel fan-out overhead.
#[derive(Debug, Clone)]
pub struct ParallelOverhead {
    pub size: usize,
    pub serial_ns: u64,
    pub parallel_ns: u64,
    pub speedup: f64,
}

/// Create a deterministically filled n×n matrix.
fn pattern_matrix(n: usize, salt: usize) -> Matrix {
    let data = (0..n * n)
        .map(|idx| ((idx * 31 + salt * 17) % 100) as f64)
        .collect();
    Matrix::from_vec(n, data).expect("benchmark sizes are positive")
}

fn run_core(core: &dyn CoreMultiplier, a: &Matrix, b: &Matrix, opts: &Options) {
    let cancel = CancellationToken::new();
    let observer = NoOpObserver::new();
    let _ = core.multiply_core(&cancel, &observer, 0, a, b, opts);
}

/// Benchmark the direct kernel at a given size.
#[must_use]
pub fn bench_naive(n: usize) -> Duration {
    let a = pattern_matrix(n, 1);
    let b = pattern_matrix(n, 2);
    let core = NaiveCore::new();
    let opts = Options::default();
    benchmark(5, || run_core(&core, &a, &b, &opts))
}

/// Benchmark serial Strassen at a given size and base-case threshold.
#[must_use]
pub fn bench_strassen(n: usize, threshold: usize) -> Duration {
    let a = pattern_matrix(n, 1);
    let b = pattern_matrix(n, 2);
    let core = StrassenCore::new(Arc::new(SerialElementwise::new()));
    let opts = Options {
        base_threshold: threshold,
        ..Default::default()
    };
    benchmark(5, || run_core(&core, &a, &b, &opts))
}

/// Time naive vs Strassen at each size and report who wins.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn find_crossover(sizes: &[usize]) -> Vec<CrossoverPoint> {
    sizes
        .iter()
        .map(|&n| {
            let a = pattern_matrix(n, 1);
            let b = pattern_matrix(n, 2);

            let naive_core = NaiveCore::new();
            let naive_opts = Options::default();
            let naive = benchmark_detailed(2, 5, || run_core(&naive_core, &a, &b, &naive_opts))
                .with_name(format!("naive_{n}"));

            let strassen_core = StrassenCore::new(Arc::new(SerialElementwise::new()));
            let strassen_opts = Options {
                base_threshold: BENCH_BASE_THRESHOLD.min(n / 2).max(1),
                ..Default::default()
            };
            let strassen =
                benchmark_detailed(2, 5, || run_core(&strassen_core, &a, &b, &strassen_opts))
                    .with_name(format!("strassen_{n}"));

            CrossoverPoint {
                size: n,
                naive_ns: naive.median.as_nanos() as u64,
                strassen_ns: strassen.median.as_nanos() as u64,
                strassen_is_faster: strassen.median < naive.median,
            }
        })
        .collect()
}

/// Measure fan-out overhead by timing serial vs parallel Strassen.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn measure_parallel_overhead(n: usize) -> ParallelOverhead {
    let a = pattern_matrix(n, 1);
    let b = pattern_matrix(n, 2);
    let opts = Options {
        base_threshold: BENCH_BASE_THRESHOLD.min(n / 2).max(1),
        parallel_threshold: BENCH_BASE_THRESHOLD,
        ..Default::default()
    };

    let serial_core = StrassenCore::new(Arc::new(SerialElementwise::new()));
    let serial = benchmark_detailed(2, 5, || run_core(&serial_core, &a, &b, &opts));

    let parallel_core = ParallelStrassenCore::new(Arc::new(SerialElementwise::new()));
    let parallel = benchmark_detailed(2, 5, || run_core(&parallel_core, &a, &b, &opts));

    let serial_ns = serial.median.as_nanos() as u64;
    let parallel_ns = parallel.median.as_nanos() as u64;

    ParallelOverhead {
        size: n,
        serial_ns,
        parallel_ns,
        speedup: if parallel_ns > 0 {
            serial_ns as f64 / parallel_ns as f64
        } else {
            1.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bench_naive_small() {
        let duration = bench_naive(16);
        assert!(duration.as_nanos() > 0);
    }

    #[test]
    fn bench_strassen_small() {
        let duration = bench_strassen(16, 4);
        assert!(duration.as_nanos() > 0);
    }

    #[test]
    fn find_crossover_runs() {
        let points = find_crossover(&[8, 16]);
        assert_eq!(points.len(), 2);
        for p in &points {
            assert!(p.naive_ns > 0);
            assert!(p.strassen_ns > 0);
        }
    }

    #[test]
    fn measure_parallel_overhead_runs() {
        let overhead = measure_parallel_overhead(32);
        assert!(overhead.serial_ns > 0);
        assert!(overhead.parallel_ns > 0);
        assert!(overhead.speedup > 0.0);
    }

    #[test]
    fn pattern_matrix_is_deterministic() {
        assert_eq!(pattern_matrix(8, 1), pattern_matrix(8, 1));
        assert_ne!(pattern_matrix(8, 1), pattern_matrix(8, 2));
    }
}
