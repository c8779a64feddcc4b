//! Benchmark runner for calibration.

use std::time::{Duration, Instant};

/// Run a benchmark with a warmup phase, returning timing statistics.
pub fn benchmark_detailed<F>(warmup_iters: u32, measure_iters: u32, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    for _ in 0..warmup_iters {
        f();
    }

    let mut durations = Vec::with_capacity(measure_iters as usize);
    for _ in 0..measure_iters {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    durations.sort();
    let min = durations.first().copied().unwrap_or_default();
    let max = durations.last().copied().unwrap_or_default();
    let median = if durations.len() % 2 == 1 {
        durations[durations.len() / 2]
    } else {
        let mid = durations.len() / 2;
        (durations[mid - 1] + durations[mid]) / 2
    };
    let total: Duration = durations.iter().sum();
    let mean = total / measure_iters.max(1);

    BenchmarkResult {
        name: String::new(),
        mean,
        median,
        min,
        max,
        iterations: measure_iters,
    }
}

/// Run a benchmark and return its median duration.
pub fn benchmark<F>(iterations: u32, f: F) -> Duration
where
    F: FnMut(),
{
    benchmark_detailed(1, iterations, f).median
}

/// Result of a single benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub name: String,
    pub mean: Duration,
    pub median: Duration,
    pub min: Duration,
    pub max: Duration,
    pub iterations: u32,
}

impl BenchmarkResult {
    /// Create a named result.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
