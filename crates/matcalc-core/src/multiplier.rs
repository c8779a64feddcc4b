//! Multiplier traits and the `MatMultiplier` decorator.
//!
//! `Multiplier` is the public trait consumed by orchestration.
//! `CoreMultiplier` is the internal trait implemented by algorithms.
//! `MatMultiplier` is a decorator that adds operand validation, the 1×1
//! fast path, and the entry cancellation check.

use std::sync::Arc;

use crate::buffer::Matrix;
use crate::observer::ProgressObserver;
use crate::options::Options;
use crate::progress::{CancellationToken, ProgressUpdate};

/// Error type for matrix multiplication.
#[derive(Debug, thiserror::Error)]
pub enum MatError {
    /// Mismatched or non-halvable operand sizes.
    #[error("dimension error: {0}")]
    Dimension(String),

    /// Buffer allocation failure.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// Non-positive or otherwise unusable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A calculation-adjacent failure (I/O, persistence).
    #[error("calculation error: {0}")]
    Calculation(String),

    /// Multiplication was cancelled.
    #[error("multiplication cancelled")]
    Cancelled,

    /// Multiplication exceeded its deadline.
    #[error("multiplication timed out after {0}")]
    Timeout(String),

    /// Results from different algorithms don't match.
    #[error("result mismatch between algorithms")]
    Mismatch,
}

/// Public trait for matrix multipliers, consumed by orchestration.
pub trait Multiplier: Send + Sync {
    /// Compute `a * b` with the given options.
    fn multiply(
        &self,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
        calc_index: usize,
        a: &Matrix,
        b: &Matrix,
        opts: &Options,
    ) -> Result<Matrix, MatError>;

    /// Get the name of this multiplier.
    fn name(&self) -> &'static str;
}

/// Internal trait for algorithm implementations.
/// Wrapped by `MatMultiplier` which adds validation and the fast path.
pub trait CoreMultiplier: Send + Sync {
    /// Perform the core multiplication for validated operands.
    fn multiply_core(
        &self,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
        calc_index: usize,
        a: &Matrix,
        b: &Matrix,
        opts: &Options,
    ) -> Result<Matrix, MatError>;

    /// Get the name of this algorithm.
    fn name(&self) -> &'static str;
}

/// Decorator that wraps a `CoreMultiplier` with operand validation and the
/// trivial 1×1 fast path.
pub struct MatMultiplier {
    inner: Arc<dyn CoreMultiplier>,
}

impl MatMultiplier {
    /// Create a new `MatMultiplier` wrapping the given core algorithm.
    #[must_use]
    pub fn new(inner: Arc<dyn CoreMultiplier>) -> Self {
        Self { inner }
    }

    /// Fast path for 1×1 operands.
    fn multiply_trivial(a: &Matrix, b: &Matrix) -> Result<Matrix, MatError> {
        let mut out = Matrix::zeros(1)?;
        out.set(0, 0, a.get(0, 0) * b.get(0, 0));
        Ok(out)
    }
}

impl Multiplier for MatMultiplier {
    fn multiply(
        &self,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
        calc_index: usize,
        a: &Matrix,
        b: &Matrix,
        opts: &Options,
    ) -> Result<Matrix, MatError> {
        if a.dim() != b.dim() {
            return Err(MatError::Dimension(format!(
                "operand dimensions differ: {} vs {}",
                a.dim(),
                b.dim()
            )));
        }

        // Fast path for the smallest operands
        if a.dim() == 1 {
            observer.on_progress(&ProgressUpdate::done(calc_index, self.inner.name()));
            return Self::multiply_trivial(a, b);
        }

        // Check cancellation before starting
        if cancel.is_cancelled() {
            return Err(MatError::Cancelled);
        }

        self.inner
            .multiply_core(cancel, observer, calc_index, a, b, opts)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
