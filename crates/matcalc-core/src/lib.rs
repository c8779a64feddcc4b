//! # matcalc-core
//!
//! Core library for the MatCalc-rs matrix product calculator.
//! Implements direct O(n³) and Strassen multiplication over square f64
//! matrices, with serial and fork-join parallel variants.

pub mod buffer;
pub mod constants;
pub mod elementwise;
pub mod memory_budget;
pub mod multiplier;
pub mod naive;
pub mod observer;
pub mod observers;
pub mod options;
pub mod parallel;
pub mod progress;
pub mod registry;
pub mod scheduler;
pub mod strassen;

// Re-exports
pub use buffer::{Matrix, MatrixView, MatrixViewMut, Quadrant};
pub use constants::{
    exit_codes, DEFAULT_BASE_THRESHOLD, DEFAULT_MATRIX_SIZE, DEFAULT_PARALLEL_THRESHOLD,
};
pub use elementwise::ElementwiseEngine;
pub use multiplier::{CoreMultiplier, MatError, MatMultiplier, Multiplier};
pub use observer::{FrozenObserver, ProgressObserver};
pub use options::Options;
pub use progress::ProgressUpdate;
pub use registry::{DefaultFactory, MultiplierFactory};

/// Multiply two square matrices with the serial Strassen engine.
///
/// This is a convenience function for simple use cases. For advanced
/// configuration (engines, thresholds, progress, cancellation), build a
/// multiplier through [`registry::DefaultFactory`].
///
/// # Example
/// ```
/// use matcalc_core::Matrix;
///
/// let a = Matrix::from_vec(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Matrix::from_vec(2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
/// let c = matcalc_core::multiply(&a, &b).unwrap();
/// assert_eq!(c.get(0, 0), 19.0);
/// assert_eq!(c.get(0, 1), 22.0);
/// assert_eq!(c.get(1, 0), 43.0);
/// assert_eq!(c.get(1, 1), 50.0);
/// ```
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, MatError> {
    use std::sync::Arc;

    use elementwise::SerialElementwise;
    use observers::NoOpObserver;
    use progress::CancellationToken;
    use strassen::StrassenCore;

    let calc = MatMultiplier::new(Arc::new(StrassenCore::new(Arc::new(
        SerialElementwise::new(),
    ))));
    let cancel = CancellationToken::new();
    let observer = NoOpObserver::new();
    let opts = Options::default();
    calc.multiply(&cancel, &observer, 0, a, b, &opts)
}
