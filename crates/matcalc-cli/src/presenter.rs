//! CLI result presenter.

use std::time::Duration;

use matcalc_core::buffer::Matrix;
use matcalc_orchestration::interfaces::{MultiplyResult, ResultPresenter};

use crate::output::{format_duration, format_matrix, format_millis, format_number};

/// CLI result presenter.
pub struct CLIResultPresenter {
    verbose: bool,
    quiet: bool,
}

impl CLIResultPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }
}

impl ResultPresenter for CLIResultPresenter {
    fn present_result(
        &self,
        algorithm: &str,
        n: usize,
        result: &Matrix,
        duration: Duration,
        details: bool,
    ) {
        if self.quiet {
            // Quiet mode: only the elapsed milliseconds.
            println!("{}", format_millis(duration));
            return;
        }

        println!("Algorithm: {algorithm}");
        println!("Size: {}x{}", format_number(n), format_number(n));
        println!("Elapsed: {} ms", format_millis(duration));

        if details {
            let data = result.as_slice();
            let sum: f64 = data.iter().sum();
            let norm: f64 = data.iter().map(|v| v * v).sum::<f64>().sqrt();
            let min = data.iter().copied().fold(f64::INFINITY, f64::min);
            let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            println!("Checksum: {sum}");
            println!("Frobenius norm: {norm:.6}");
            println!("Min element: {min}");
            println!("Max element: {max}");
        }

        print!("{}", format_matrix(result, self.verbose));
    }

    fn present_comparison(&self, results: &[MultiplyResult]) {
        if self.quiet {
            return;
        }

        println!("\nComparison Results:");
        println!("{:-<60}", "");
        for result in results {
            let status = if result.outcome.is_err() {
                "ERROR"
            } else {
                "OK"
            };
            println!(
                "  {:<20} {:>10} [{}]",
                result.algorithm,
                format_duration(result.duration),
                status,
            );
        }
    }

    fn present_error(&self, error: &str) {
        eprintln!("Error: {error}");
    }
}
