//! Parallel Strassen engine: explicit fork-join over the seven branches.
//!
//! Each expanded level runs three phases separated by completion barriers:
//! (a) quadrant views and every frame buffer are set up before fan-out,
//! (b) the seven branches (combination steps + recursive multiply) run as
//! independent tasks, (c) the four output combinations run as independent
//! tasks. A sequential assembly then copies the four blocks into the output.
//! Every task writes only to buffers it alone owns, so the barriers are the
//! only synchronization needed.

use std::sync::Arc;

use matcalc_memory::pool::with_frame;
use tracing::debug;

use crate::buffer::{Matrix, MatrixView, MatrixViewMut, Quadrant};
use crate::elementwise::ElementwiseEngine;
use crate::multiplier::{CoreMultiplier, MatError};
use crate::observer::ProgressObserver;
use crate::options::Options;
use crate::progress::{CancellationToken, ProgressUpdate};
use crate::scheduler::{Task, TaskScheduler};
use crate::strassen::{validate_halvable, view, view_mut, RecursionCtx, StrassenCore};

/// Bytes one expanded frame draws from its arena: seven products, ten
/// branch scratch buffers, four output blocks, and four combination
/// scratch buffers of half×half doubles.
fn frame_bytes(half: usize) -> usize {
    25 * half * half * std::mem::size_of::<f64>()
}

/// Fork-join Strassen engine.
///
/// Fans out while the block size stays above the parallel cutoff, then
/// hands the sub-problems to the serial engine. Output is bit-identical to
/// the serial variant: the per-cell operations and their order are the same.
pub struct ParallelStrassenCore {
    engine: Arc<dyn ElementwiseEngine>,
    serial: StrassenCore,
}

impl ParallelStrassenCore {
    /// Create an engine using the given elementwise implementation.
    #[must_use]
    pub fn new(engine: Arc<dyn ElementwiseEngine>) -> Self {
        Self {
            serial: StrassenCore::new(Arc::clone(&engine)),
            engine,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn parallel_into(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        mut out: MatrixViewMut<'_>,
        threshold: usize,
        cutoff: usize,
        depth: usize,
        ctx: &RecursionCtx<'_>,
    ) -> Result<(), MatError> {
        let n = a.dim();
        if n <= threshold || n <= cutoff {
            return self.serial.strassen_into(a, b, out, threshold, depth, ctx);
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

            // Phase (a): every buffer this frame needs, before any fan-out.
            let m1 = arena.alloc_matrix(half);
            let m2 = arena.alloc_matrix(half);
            let m3 = arena.alloc_matrix(half);
            let m4 = arena.alloc_matrix(half);
            let m5 = arena.alloc_matrix(half);
            let m6 = arena.alloc_matrix(half);
            let m7 = arena.alloc_matrix(half);
            let s1a = arena.alloc_matrix(half);
            let s1b = arena.alloc_matrix(half);
            let s2 = arena.alloc_matrix(half);
            let s3 = arena.alloc_matrix(half);
            let s4 = arena.alloc_matrix(half);
            let s5 = arena.alloc_matrix(half);
            let s6a = arena.alloc_matrix(half);
            let s6b = arena.alloc_matrix(half);
            let s7a = arena.alloc_matrix(half);
            let s7b = arena.alloc_matrix(half);
            let c11 = arena.alloc_matrix(half);
            let c12 = arena.alloc_matrix(half);
            let c21 = arena.alloc_matrix(half);
            let c22 = arena.alloc_matrix(half);
            let u1 = arena.alloc_matrix(half);
            let u2 = arena.alloc_matrix(half);
            let u3 = arena.alloc_matrix(half);
            let u4 = arena.alloc_matrix(half);

            let eng = &*self.engine;
            let next = depth + 1;

            // Phase (b): the seven branches, one task each.
            let branch_tasks: Vec<Task<'_>> = vec![
                {
                    // M1 = (A11 + A22)(B11 + B22)
                    let (lhs, rhs, m) = (&mut *s1a, &mut *s1b, &mut *m1);
                    Box::new(move || {
                        eng.add(a11, a22, view_mut(lhs, half))?;
                        eng.add(b11, b22, view_mut(rhs, half))?;
                        self.parallel_into(
                            view(lhs, half),
                            view(rhs, half),
                            view_mut(m, half),
                            threshold,
                            cutoff,
                            next,
                            ctx,
                        )?;
                        ctx.branch_done(depth);
                        Ok(())
                    }) as Task<'_>
                },
                {
                    // M2 = (A21 + A22) B11
                    let (lhs, m) = (&mut *s2, &mut *m2);
                    Box::new(move || {
                        eng.add(a21, a22, view_mut(lhs, half))?;
                        self.parallel_into(
                            view(lhs, half),
                            b11,
                            view_mut(m, half),
                            threshold,
                            cutoff,
                            next,
                            ctx,
                        )?;
                        ctx.branch_done(depth);
                        Ok(())
                    }) as Task<'_>
                },
                {
                    // M3 = A11 (B12 - B22)
                    let (rhs, m) = (&mut *s3, &mut *m3);
                    Box::new(move || {
                        eng.sub(b12, b22, view_mut(rhs, half))?;
                        self.parallel_into(
                            a11,
                            view(rhs, half),
                            view_mut(m, half),
                            threshold,
                            cutoff,
                            next,
                            ctx,
                        )?;
                        ctx.branch_done(depth);
                        Ok(())
                    }) as Task<'_>
                },
                {
                    // M4 = A22 (B21 - B11)
                    let (rhs, m) = (&mut *s4, &mut *m4);
                    Box::new(move || {
                        eng.sub(b21, b11, view_mut(rhs, half))?;
                        self.parallel_into(
                            a22,
                            view(rhs, half),
                            view_mut(m, half),
                            threshold,
                            cutoff,
                            next,
                            ctx,
                        )?;
                        ctx.branch_done(depth);
                        Ok(())
                    }) as Task<'_>
                },
                {
                    // M5 = (A11 + A12) B22
                    let (lhs, m) = (&mut *s5, &mut *m5);
                    Box::new(move || {
                        eng.add(a11, a12, view_mut(lhs, half))?;
                        self.parallel_into(
                            view(lhs, half),
                            b22,
                            view_mut(m, half),
                            threshold,
                            cutoff,
                            next,
                            ctx,
                        )?;
                        ctx.branch_done(depth);
                        Ok(())
                    }) as Task<'_>
                },
                {
                    // M6 = (A21 - A11)(B11 + B12)
                    let (lhs, rhs, m) = (&mut *s6a, &mut *s6b, &mut *m6);
                    Box::new(move || {
                        eng.sub(a21, a11, view_mut(lhs, half))?;
                        eng.add(b11, b12, view_mut(rhs, half))?;
                        self.parallel_into(
                            view(lhs, half),
                            view(rhs, half),
                            view_mut(m, half),
                            threshold,
                            cutoff,
                            next,
                            ctx,
                        )?;
                        ctx.branch_done(depth);
                        Ok(())
                    }) as Task<'_>
                },
                {
                    // M7 = (A12 - A22)(B21 + B22)
                    let (lhs, rhs, m) = (&mut *s7a, &mut *s7b, &mut *m7);
                    Box::new(move || {
                        eng.sub(a12, a22, view_mut(lhs, half))?;
                        eng.add(b21, b22, view_mut(rhs, half))?;
                        self.parallel_into(
                            view(lhs, half),
                            view(rhs, half),
                            view_mut(m, half),
                            threshold,
                            cutoff,
                            next,
                            ctx,
                        )?;
                        ctx.branch_done(depth);
                        Ok(())
                    }) as Task<'_>
                },
            ];
            TaskScheduler::run(branch_tasks)?;

            // Phase (c): the four output combinations, one task each.
            let (m1, m2, m3, m4) = (&*m1, &*m2, &*m3, &*m4);
            let (m5, m6, m7) = (&*m5, &*m6, &*m7);
            let combine_tasks: Vec<Task<'_>> = vec![
                {
                    // C11 = M1 + M4 + M7 - M5
                    let (t1, t2, c) = (&mut *u1, &mut *u2, &mut *c11);
                    Box::new(move || {
                        eng.add(view(m1, half), view(m4, half), view_mut(t1, half))?;
                        eng.add(view(t1, half), view(m7, half), view_mut(t2, half))?;
                        eng.sub(view(t2, half), view(m5, half), view_mut(c, half))
                    }) as Task<'_>
                },
                {
                    // C12 = M3 + M5
                    let c = &mut *c12;
                    Box::new(move || eng.add(view(m3, half), view(m5, half), view_mut(c, half)))
                        as Task<'_>
                },
                {
                    // C21 = M2 + M4
                    let c = &mut *c21;
                    Box::new(move || eng.add(view(m2, half), view(m4, half), view_mut(c, half)))
                        as Task<'_>
                },
                {
                    // C22 = M1 + M3 + M6 - M2
                    let (t1, t2, c) = (&mut *u3, &mut *u4, &mut *c22);
                    Box::new(move || {
                        eng.add(view(m1, half), view(m3, half), view_mut(t1, half))?;
                        eng.add(view(t1, half), view(m6, half), view_mut(t2, half))?;
                        eng.sub(view(t2, half), view(m2, half), view_mut(c, half))
                    }) as Task<'_>
                },
            ];
            TaskScheduler::run(combine_tasks)?;

            // Assemble the output from the four blocks; each cell written once.
            out.quadrant_mut(Quadrant::TopLeft).copy_from(view(c11, half));
            out.quadrant_mut(Quadrant::TopRight)
                .copy_from(view(c12, half));
            out.quadrant_mut(Quadrant::BottomLeft)
                .copy_from(view(c21, half));
            out.quadrant_mut(Quadrant::BottomRight)
                .copy_from(view(c22, half));
            Ok(())
        })
    }
}

impl CoreMultiplier for ParallelStrassenCore {
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
        debug!(
            n,
            threshold,
            cutoff = opts.parallel_threshold,
            engine = self.engine.name(),
            "parallel strassen multiply"
        );

        let mut out = Matrix::zeros(n)?;
        let ctx = RecursionCtx::new(cancel, observer, calc_index, self.name());
        self.parallel_into(
            a.as_view(),
            b.as_view(),
            out.as_view_mut(),
            threshold,
            opts.parallel_threshold,
            0,
            &ctx,
        )?;
        observer.on_progress(&ProgressUpdate::done(calc_index, self.name()));
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "ParallelStrassen"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementwise::{ParallelElementwise, SerialElementwise};
    use crate::observers::NoOpObserver;

    fn pattern_matrix(n: usize, salt: usize) -> Matrix {
        let data = (0..n * n)
            .map(|idx| ((idx * 29 + salt * 13) % 100) as f64)
            .collect();
        Matrix::from_vec(n, data).unwrap()
    }

    fn opts(threshold: usize, cutoff: usize) -> Options {
        Options {
            base_threshold: threshold,
            parallel_threshold: cutoff,
            ..Default::default()
        }
    }

    fn parallel_compute(a: &Matrix, b: &Matrix, threshold: usize, cutoff: usize) -> Matrix {
        let calc = ParallelStrassenCore::new(Arc::new(SerialElementwise::new()));
        calc.multiply_core(
            &CancellationToken::new(),
            &NoOpObserver::new(),
            0,
            a,
            b,
            &opts(threshold, cutoff),
        )
        .unwrap()
    }

    fn serial_compute(a: &Matrix, b: &Matrix, threshold: usize) -> Matrix {
        let calc = StrassenCore::new(Arc::new(SerialElementwise::new()));
        calc.multiply_core(
            &CancellationToken::new(),
            &NoOpObserver::new(),
            0,
            a,
            b,
            &opts(threshold, 0),
        )
        .unwrap()
    }

    #[test]
    fn parallel_output_is_bit_identical_to_serial() {
        for n in [8usize, 16, 32, 64] {
            let a = pattern_matrix(n, 1);
            let b = pattern_matrix(n, 2);
            let serial = serial_compute(&a, &b, 4);
            // Cutoff 0 forces fan-out at every level above the base case.
            let parallel = parallel_compute(&a, &b, 4, 0);
            assert_eq!(serial, parallel, "divergence at n={n}");
        }
    }

    #[test]
    fn cutoff_falls_back_to_serial_recursion() {
        let a = pattern_matrix(16, 3);
        let b = pattern_matrix(16, 4);
        // Cutoff above n: the whole call runs on the serial path.
        let fallback = parallel_compute(&a, &b, 2, 1024);
        assert_eq!(fallback, serial_compute(&a, &b, 2));
    }

    #[test]
    fn parallel_elementwise_engine_matches() {
        let a = pattern_matrix(32, 5);
        let b = pattern_matrix(32, 6);
        let with_parallel_engine = {
            let calc = ParallelStrassenCore::new(Arc::new(ParallelElementwise::new(1)));
            calc.multiply_core(
                &CancellationToken::new(),
                &NoOpObserver::new(),
                0,
                &a,
                &b,
                &opts(4, 0),
            )
            .unwrap()
        };
        assert_eq!(with_parallel_engine, serial_compute(&a, &b, 4));
    }

    #[test]
    fn identity_through_parallel_recursion() {
        let a = pattern_matrix(32, 9);
        let id = Matrix::identity(32).unwrap();
        assert_eq!(parallel_compute(&a, &id, 2, 0), a);
    }

    #[test]
    fn non_halvable_size_rejected() {
        let a = pattern_matrix(12, 1);
        let b = pattern_matrix(12, 2);
        let calc = ParallelStrassenCore::new(Arc::new(SerialElementwise::new()));
        let result = calc.multiply_core(
            &CancellationToken::new(),
            &NoOpObserver::new(),
            0,
            &a,
            &b,
            &opts(2, 0),
        );
        assert!(matches!(result, Err(MatError::Dimension(_))));
    }

    #[test]
    fn cancellation_aborts_fanned_out_work() {
        let a = pattern_matrix(64, 1);
        let b = pattern_matrix(64, 2);
        let calc = ParallelStrassenCore::new(Arc::new(SerialElementwise::new()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = calc.multiply_core(
            &cancel,
            &NoOpObserver::new(),
            0,
            &a,
            &b,
            &opts(2, 0),
        );
        assert!(matches!(result, Err(MatError::Cancelled)));
    }
}
