//! Strassen's recursive matrix multiplication (serial engine).
//!
//! Each level partitions the operands into quadrant views (no copies),
//! computes seven sub-products from linear combinations of quadrants, and
//! recombines them into the four output quadrants. All temporaries of a
//! level live in one pooled frame arena released when the frame returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use matcalc_memory::pool::with_frame;
use tracing::debug;

use crate::buffer::{Matrix, MatrixView, MatrixViewMut, Quadrant};
use crate::elementwise::ElementwiseEngine;
use crate::multiplier::{CoreMultiplier, MatError};
use crate::naive;
use crate::observer::{FrozenObserver, ProgressObserver};
use crate::options::Options;
use crate::progress::{CancellationToken, ProgressUpdate};

/// Number of recursive sub-products per decomposition level.
pub(crate) const BRANCHES: u64 = 7;

/// Verify that `n` can be halved repeatedly until it reaches the base case.
///
/// Violating this is a caller error; the recursion never pads or truncates.
pub(crate) fn validate_halvable(n: usize, threshold: usize) -> Result<(), MatError> {
    let mut m = n;
    while m > threshold {
        if m % 2 != 0 {
            return Err(MatError::Dimension(format!(
                "size {n} is not evenly halvable down to the base case {threshold}"
            )));
        }
        m /= 2;
    }
    Ok(())
}

/// View an arena buffer as a matrix.
pub(crate) fn view(buf: &[f64], n: usize) -> MatrixView<'_> {
    MatrixView::from_slice(buf, n)
}

/// Mutably view an arena buffer as a matrix.
pub(crate) fn view_mut(buf: &mut [f64], n: usize) -> MatrixViewMut<'_> {
    MatrixViewMut::from_slice(buf, n)
}

/// Per-call state threaded through the recursion.
pub(crate) struct RecursionCtx<'a> {
    pub cancel: &'a CancellationToken,
    pub observer: &'a dyn ProgressObserver,
    pub frozen: FrozenObserver,
    pub calc_index: usize,
    pub algorithm: &'static str,
    completed: AtomicU64,
}

impl<'a> RecursionCtx<'a> {
    pub(crate) fn new(
        cancel: &'a CancellationToken,
        observer: &'a dyn ProgressObserver,
        calc_index: usize,
        algorithm: &'static str,
    ) -> Self {
        Self {
            cancel,
            observer,
            frozen: observer.freeze(),
            calc_index,
            algorithm,
            completed: AtomicU64::new(0),
        }
    }

    /// Record one finished top-level branch; nested levels stay silent.
    pub(crate) fn branch_done(&self, depth: usize) {
        if depth != 0 {
            return;
        }
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        #[allow(clippy::cast_precision_loss)]
        let progress = done as f64 / BRANCHES as f64;
        if self.frozen.should_report(progress) {
            self.frozen.update(progress);
            self.observer.on_progress(&ProgressUpdate::new(
                self.calc_index,
                self.algorithm,
                progress,
                done,
                BRANCHES,
            ));
        }
    }
}

/// Bytes one serial frame draws from its arena: seven products plus two
/// scratch buffers of half×half doubles.
fn frame_bytes(half: usize) -> usize {
    9 * half * half * std::mem::size_of::<f64>()
}

/// Serial Strassen engine.
pub struct StrassenCore {
    engine: Arc<dyn ElementwiseEngine>,
}

impl StrassenCore {
    /// Create an engine using the given elementwise implementation.
    #[must_use]
    pub fn new(engine: Arc<dyn ElementwiseEngine>) -> Self {
        Self { engine }
    }

    /// Recursive worker. `out` receives the full product of `a * b`.
    pub(crate) fn strassen_into(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        mut out: MatrixViewMut<'_>,
        threshold: usize,
        depth: usize,
        ctx: &RecursionCtx<'_>,
    ) -> Result<(), MatError> {
        let n = a.dim();
        if n <= threshold {
            return naive::multiply_into(a, b, out);
        }
        ctx.cancel.check_cancelled()?;
        let half = n / 2;

        with_frame(frame_bytes(half), |arena| {
            let (a11, a12) = (a.quadrant(Quadrant::TopLeft), a.quadrant(Quadrant::TopRight));
            let (a21, a22) = (
                a.quadrant(Quadrant::BottomLeft),
                a.quadrant(Quadrant::BottomRight),
            );
            let (b11, b12) = (b.quadrant(Quadrant::TopLeft), b.quadrant(Quadrant::TopRight));
            let (b21, b22) = (
                b.quadrant(Quadrant::BottomLeft),
                b.quadrant(Quadrant::BottomRight),
            );

            let t1 = arena.alloc_matrix(half);
            let t2 = arena.alloc_matrix(half);
            let m1 = arena.alloc_matrix(half);
            let m2 = arena.alloc_matrix(half);
            let m3 = arena.alloc_matrix(half);
            let m4 = arena.alloc_matrix(half);
            let m5 = arena.alloc_matrix(half);
            let m6 = arena.alloc_matrix(half);
            let m7 = arena.alloc_matrix(half);

            let eng = &*self.engine;
            let next = depth + 1;

            // M1 = (A11 + A22)(B11 + B22)
            eng.add(a11, a22, view_mut(t1, half))?;
            eng.add(b11, b22, view_mut(t2, half))?;
            self.strassen_into(
                view(t1, half),
                view(t2, half),
                view_mut(m1, half),
                threshold,
                next,
                ctx,
            )?;
            ctx.branch_done(depth);

            // M2 = (A21 + A22) B11
            eng.add(a21, a22, view_mut(t1, half))?;
            self.strassen_into(view(t1, half), b11, view_mut(m2, half), threshold, next, ctx)?;
            ctx.branch_done(depth);

            // M3 = A11 (B12 - B22)
            eng.sub(b12, b22, view_mut(t1, half))?;
            self.strassen_into(a11, view(t1, half), view_mut(m3, half), threshold, next, ctx)?;
            ctx.branch_done(depth);

            // M4 = A22 (B21 - B11)
            eng.sub(b21, b11, view_mut(t1, half))?;
            self.strassen_into(a22, view(t1, half), view_mut(m4, half), threshold, next, ctx)?;
            ctx.branch_done(depth);

            // M5 = (A11 + A12) B22
            eng.add(a11, a12, view_mut(t1, half))?;
            self.strassen_into(view(t1, half), b22, view_mut(m5, half), threshold, next, ctx)?;
            ctx.branch_done(depth);

            // M6 = (A21 - A11)(B11 + B12)
            eng.sub(a21, a11, view_mut(t1, half))?;
            eng.add(b11, b12, view_mut(t2, half))?;
            self.strassen_into(
                view(t1, half),
                view(t2, half),
                view_mut(m6, half),
                threshold,
                next,
                ctx,
            )?;
            ctx.branch_done(depth);

            // M7 = (A12 - A22)(B21 + B22)
            eng.sub(a12, a22, view_mut(t1, half))?;
            eng.add(b21, b22, view_mut(t2, half))?;
            self.strassen_into(
                view(t1, half),
                view(t2, half),
                view_mut(m7, half),
                threshold,
                next,
                ctx,
            )?;
            ctx.branch_done(depth);

            // C11 = M1 + M4 + M7 - M5
            eng.add(view(m1, half), view(m4, half), view_mut(t1, half))?;
            eng.add(view(t1, half), view(m7, half), view_mut(t2, half))?;
            eng.sub(
                view(t2, half),
                view(m5, half),
                out.quadrant_mut(Quadrant::TopLeft),
            )?;

            // C12 = M3 + M5
            eng.add(
                view(m3, half),
                view(m5, half),
                out.quadrant_mut(Quadrant::TopRight),
            )?;

            // C21 = M2 + M4
            eng.add(
                view(m2, half),
                view(m4, half),
                out.quadrant_mut(Quadrant::BottomLeft),
            )?;

            // C22 = M1 + M3 + M6 - M2
            eng.add(view(m1, half), view(m3, half), view_mut(t1, half))?;
            eng.add(view(t1, half), view(m6, half), view_mut(t2, half))?;
            eng.sub(
                view(t2, half),
                view(m2, half),
                out.quadrant_mut(Quadrant::BottomRight),
            )
        })
    }
}

impl CoreMultiplier for StrassenCore {
    fn multiply_core(
        &self,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
        calc_index: usize,
        a: &Matrix,
        b: &Matrix,
        opts: &Options,
    ) -> Result<Matrix, MatError> {
        let n = a.dim();
        let threshold = opts.base_threshold.max(1);
        validate_halvable(n, threshold)?;
        debug!(n, threshold, engine = self.engine.name(), "strassen multiply");

        let mut out = Matrix::zeros(n)?;
        let ctx = RecursionCtx::new(cancel, observer, calc_index, self.name());
        self.strassen_into(a.as_view(), b.as_view(), out.as_view_mut(), threshold, 0, &ctx)?;
        observer.on_progress(&ProgressUpdate::done(calc_index, self.name()));
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "Strassen"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementwise::SerialElementwise;
    use crate::naive::NaiveCore;
    use crate::observers::NoOpObserver;

    fn strassen_opts(threshold: usize) -> Options {
        Options {
            base_threshold: threshold,
            ..Default::default()
        }
    }

    fn compute(a: &Matrix, b: &Matrix, threshold: usize) -> Matrix {
        let calc = StrassenCore::new(Arc::new(SerialElementwise::new()));
        calc.multiply_core(
            &CancellationToken::new(),
            &NoOpObserver::new(),
            0,
            a,
            b,
            &strassen_opts(threshold),
        )
        .unwrap()
    }

    fn naive_compute(a: &Matrix, b: &Matrix) -> Matrix {
        NaiveCore::new()
            .multiply_core(
                &CancellationToken::new(),
                &NoOpObserver::new(),
                0,
                a,
                b,
                &Options::default(),
            )
            .unwrap()
    }

    fn pattern_matrix(n: usize, salt: usize) -> Matrix {
        let data = (0..n * n)
            .map(|idx| ((idx * 31 + salt * 17) % 100) as f64)
            .collect();
        Matrix::from_vec(n, data).unwrap()
    }

    #[test]
    fn validate_halvable_accepts_powers_of_two() {
        assert!(validate_halvable(64, 2).is_ok());
        assert!(validate_halvable(128, 1).is_ok());
        assert!(validate_halvable(2, 2).is_ok());
    }

    #[test]
    fn validate_halvable_rejects_odd_intermediate() {
        assert!(matches!(
            validate_halvable(6, 2),
            Err(MatError::Dimension(_))
        ));
        assert!(matches!(
            validate_halvable(12, 2),
            Err(MatError::Dimension(_))
        ));
    }

    #[test]
    fn validate_halvable_allows_sizes_under_threshold() {
        // 48 <= 64, so it never needs halving.
        assert!(validate_halvable(48, 64).is_ok());
    }

    #[test]
    fn base_case_matches_naive_bit_for_bit() {
        // Below the threshold the same kernel with the same accumulation
        // order runs, so results are identical down to the last bit.
        let a = pattern_matrix(4, 1);
        let b = pattern_matrix(4, 2);
        assert_eq!(compute(&a, &b, 8), naive_compute(&a, &b));
    }

    #[test]
    fn recursive_product_matches_naive_exactly_for_integer_inputs() {
        // Integer-valued f64 arithmetic is exact well past these magnitudes.
        for n in [4usize, 8, 16, 32] {
            let a = pattern_matrix(n, 3);
            let b = pattern_matrix(n, 5);
            let strassen = compute(&a, &b, 2);
            let naive = naive_compute(&a, &b);
            assert_eq!(strassen, naive, "divergence at n={n}");
        }
    }

    #[test]
    fn two_by_two_product_exercises_base_case_only() {
        let a = Matrix::from_vec(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_vec(2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let c = compute(&a, &b, 2);
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn identity_is_neutral_through_recursion() {
        let a = pattern_matrix(16, 7);
        let id = Matrix::identity(16).unwrap();
        assert_eq!(compute(&a, &id, 2), a);
        assert_eq!(compute(&id, &a, 2), a);
    }

    #[test]
    fn non_halvable_size_fails_before_allocation() {
        let a = pattern_matrix(6, 1);
        let b = pattern_matrix(6, 2);
        let calc = StrassenCore::new(Arc::new(SerialElementwise::new()));
        let result = calc.multiply_core(
            &CancellationToken::new(),
            &NoOpObserver::new(),
            0,
            &a,
            &b,
            &strassen_opts(2),
        );
        assert!(matches!(result, Err(MatError::Dimension(_))));
    }

    #[test]
    fn cancellation_aborts_recursion() {
        let a = pattern_matrix(16, 1);
        let b = pattern_matrix(16, 2);
        let calc = StrassenCore::new(Arc::new(SerialElementwise::new()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = calc.multiply_core(
            &cancel,
            &NoOpObserver::new(),
            0,
            &a,
            &b,
            &strassen_opts(2),
        );
        assert!(matches!(result, Err(MatError::Cancelled)));
    }

    #[test]
    fn zero_threshold_is_floored_to_one() {
        let a = pattern_matrix(4, 1);
        let b = pattern_matrix(4, 2);
        let c = compute(&a, &b, 0);
        assert_eq!(c, naive_compute(&a, &b));
    }

    #[test]
    fn top_level_progress_reports_seven_branches() {
        use std::sync::atomic::{AtomicU64, Ordering};

        struct CountingObserver {
            updates: AtomicU64,
        }

        impl ProgressObserver for CountingObserver {
            fn on_progress(&self, update: &ProgressUpdate) {
                if !update.done {
                    self.updates.fetch_add(1, Ordering::Relaxed);
                    assert!(update.total_steps == BRANCHES);
                }
            }

            fn freeze(&self) -> FrozenObserver {
                FrozenObserver::new(0.0)
            }
        }

        let observer = CountingObserver {
            updates: AtomicU64::new(0),
        };
        let a = pattern_matrix(8, 1);
        let b = pattern_matrix(8, 2);
        let calc = StrassenCore::new(Arc::new(SerialElementwise::new()));
        calc.multiply_core(
            &CancellationToken::new(),
            &observer,
            0,
            &a,
            &b,
            &strassen_opts(2),
        )
        .unwrap();
        assert_eq!(observer.updates.load(Ordering::Relaxed), BRANCHES);
    }

    #[test]
    fn repeated_multiplies_reuse_pooled_frames() {
        let a = pattern_matrix(32, 1);
        let b = pattern_matrix(32, 2);
        let expected = naive_compute(&a, &b);
        for _ in 0..256 {
            let c = compute(&a, &b, 4);
            assert_eq!(c, expected);
        }
        // The thread-local pool is bounded no matter how many calls ran.
        assert!(matcalc_memory::pool::pooled() <= 8);
    }
}
