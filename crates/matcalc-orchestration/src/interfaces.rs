//! Orchestration interfaces.

use std::time::Duration;

use matcalc_core::buffer::Matrix;
use matcalc_core::multiplier::MatError;

/// Result of a single multiplication run.
#[derive(Debug)]
pub struct MultiplyResult {
    /// Algorithm name.
    pub algorithm: String,
    /// The computed product or a structured error.
    pub outcome: Result<Matrix, MatError>,
    /// Computation duration.
    pub duration: Duration,
}

/// Trait for presenting results to the user.
pub trait ResultPresenter: Send + Sync {
    /// Present a multiplication result.
    fn present_result(
        &self,
        algorithm: &str,
        n: usize,
        result: &Matrix,
        duration: Duration,
        details: bool,
    );

    /// Present a comparison across algorithms.
    fn present_comparison(&self, results: &[MultiplyResult]);

    /// Present an error.
    fn present_error(&self, error: &str);
}
