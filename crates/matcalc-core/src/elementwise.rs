//! Elementwise add/subtract engines.
//!
//! `ElementwiseEngine` is the narrow interface the multipliers are written
//! against. Every implementation must produce results identical to the
//! serial reference loop, so substituting one for another is transparent to
//! callers.

use rayon::prelude::*;

use crate::buffer::{MatrixView, MatrixViewMut};
use crate::constants::DEFAULT_ELEMENTWISE_GRAIN;
use crate::multiplier::MatError;

/// Position-by-position add/subtract over equal-shaped matrices.
pub trait ElementwiseEngine: Send + Sync {
    /// `out[i][j] = a[i][j] + b[i][j]` for every cell.
    fn add(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        out: MatrixViewMut<'_>,
    ) -> Result<(), MatError>;

    /// `out[i][j] = a[i][j] - b[i][j]` for every cell.
    fn sub(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        out: MatrixViewMut<'_>,
    ) -> Result<(), MatError>;

    /// Get the name of this engine.
    fn name(&self) -> &'static str;
}

fn check_dims(
    a: &MatrixView<'_>,
    b: &MatrixView<'_>,
    out: &MatrixViewMut<'_>,
) -> Result<usize, MatError> {
    let n = a.dim();
    if b.dim() != n || out.dim() != n {
        return Err(MatError::Dimension(format!(
            "elementwise operands must share one dimension: {} vs {} vs {}",
            n,
            b.dim(),
            out.dim()
        )));
    }
    Ok(n)
}

fn apply_serial(
    a: MatrixView<'_>,
    b: MatrixView<'_>,
    mut out: MatrixViewMut<'_>,
    op: impl Fn(f64, f64) -> f64,
) -> Result<(), MatError> {
    let n = check_dims(&a, &b, &out)?;
    for (i, row) in out.rows_mut().enumerate() {
        let (ra, rb) = (a.row(i), b.row(i));
        for j in 0..n {
            row[j] = op(ra[j], rb[j]);
        }
    }
    Ok(())
}

/// Straightforward single-threaded engine; the reference semantics.
pub struct SerialElementwise;

impl SerialElementwise {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SerialElementwise {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementwiseEngine for SerialElementwise {
    fn add(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        out: MatrixViewMut<'_>,
    ) -> Result<(), MatError> {
        apply_serial(a, b, out, |x, y| x + y)
    }

    fn sub(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        out: MatrixViewMut<'_>,
    ) -> Result<(), MatError> {
        apply_serial(a, b, out, |x, y| x - y)
    }

    fn name(&self) -> &'static str {
        "SerialElementwise"
    }
}

/// Engine that splits rows across the rayon pool for large operands.
///
/// Identical per-cell arithmetic to `SerialElementwise`; only the row
/// scheduling differs, so outputs are bit-for-bit equal.
pub struct ParallelElementwise {
    grain: usize,
}

impl ParallelElementwise {
    /// Create an engine that parallelizes operands of at least `grain` rows.
    #[must_use]
    pub fn new(grain: usize) -> Self {
        Self { grain }
    }

    fn apply(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        mut out: MatrixViewMut<'_>,
        op: impl Fn(f64, f64) -> f64 + Sync,
    ) -> Result<(), MatError> {
        let n = check_dims(&a, &b, &out)?;
        if n < self.grain {
            // Sequential for small operands
            for (i, row) in out.rows_mut().enumerate() {
                let (ra, rb) = (a.row(i), b.row(i));
                for j in 0..n {
                    row[j] = op(ra[j], rb[j]);
                }
            }
        } else {
            out.par_rows_mut().enumerate().for_each(|(i, row)| {
                let (ra, rb) = (a.row(i), b.row(i));
                for j in 0..n {
                    row[j] = op(ra[j], rb[j]);
                }
            });
        }
        Ok(())
    }
}

impl Default for ParallelElementwise {
    fn default() -> Self {
        Self::new(DEFAULT_ELEMENTWISE_GRAIN)
    }
}

impl ElementwiseEngine for ParallelElementwise {
    fn add(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        out: MatrixViewMut<'_>,
    ) -> Result<(), MatError> {
        self.apply(a, b, out, |x, y| x + y)
    }

    fn sub(
        &self,
        a: MatrixView<'_>,
        b: MatrixView<'_>,
        out: MatrixViewMut<'_>,
    ) -> Result<(), MatError> {
        self.apply(a, b, out, |x, y| x - y)
    }

    fn name(&self) -> &'static str {
        "ParallelElementwise"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Matrix;

    fn matrix_of(n: usize, f: impl Fn(usize, usize) -> f64) -> Matrix {
        let mut m = Matrix::zeros(n).unwrap();
        for i in 0..n {
            for j in 0..n {
                m.set(i, j, f(i, j));
            }
        }
        m
    }

    fn run_add(engine: &dyn ElementwiseEngine, a: &Matrix, b: &Matrix) -> Matrix {
        let mut out = Matrix::zeros(a.dim()).unwrap();
        engine
            .add(a.as_view(), b.as_view(), out.as_view_mut())
            .unwrap();
        out
    }

    fn run_sub(engine: &dyn ElementwiseEngine, a: &Matrix, b: &Matrix) -> Matrix {
        let mut out = Matrix::zeros(a.dim()).unwrap();
        engine
            .sub(a.as_view(), b.as_view(), out.as_view_mut())
            .unwrap();
        out
    }

    #[test]
    fn serial_add_and_sub() {
        let a = matrix_of(3, |i, j| (i * 3 + j) as f64);
        let b = matrix_of(3, |_, _| 1.0);
        let engine = SerialElementwise::new();

        let sum = run_add(&engine, &a, &b);
        assert_eq!(sum.get(0, 0), 1.0);
        assert_eq!(sum.get(2, 2), 9.0);

        let diff = run_sub(&engine, &a, &b);
        assert_eq!(diff.get(0, 0), -1.0);
        assert_eq!(diff.get(2, 2), 7.0);
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let a = matrix_of(2, |_, _| 1.0);
        let b = matrix_of(4, |_, _| 1.0);
        let mut out = Matrix::zeros(2).unwrap();
        let engine = SerialElementwise::new();
        let result = engine.add(a.as_view(), b.as_view(), out.as_view_mut());
        assert!(matches!(result, Err(MatError::Dimension(_))));
    }

    #[test]
    fn parallel_matches_serial_on_small_path() {
        // Grain above n: the sequential branch runs.
        let a = matrix_of(8, |i, j| (i as f64) - (j as f64));
        let b = matrix_of(8, |i, j| (i * j) as f64);
        let serial = run_add(&SerialElementwise::new(), &a, &b);
        let parallel = run_add(&ParallelElementwise::new(1000), &a, &b);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn parallel_matches_serial_on_parallel_path() {
        // Grain 1: every operand takes the rayon branch.
        let a = matrix_of(16, |i, j| (i * 17 + j) as f64 * 0.5);
        let b = matrix_of(16, |i, j| (j * 13 + i) as f64 * 0.25);
        let serial = run_sub(&SerialElementwise::new(), &a, &b);
        let parallel = run_sub(&ParallelElementwise::new(1), &a, &b);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn engines_operate_on_quadrant_views() {
        // Write a quadrant sum directly into a strided output view.
        let a = matrix_of(4, |i, j| (i * 4 + j) as f64);
        let mut out = Matrix::zeros(4).unwrap();
        let engine = SerialElementwise::new();
        {
            let view = a.as_view();
            let mut out_view = out.as_view_mut();
            engine
                .add(
                    view.quadrant(crate::buffer::Quadrant::TopLeft),
                    view.quadrant(crate::buffer::Quadrant::BottomRight),
                    out_view.quadrant_mut(crate::buffer::Quadrant::TopLeft),
                )
                .unwrap();
        }
        // (0,0)+(2,2) = 0+10, (1,1)+(3,3) = 5+15
        assert_eq!(out.get(0, 0), 10.0);
        assert_eq!(out.get(1, 1), 20.0);
        assert_eq!(out.get(2, 2), 0.0);
    }

    #[test]
    fn engine_names() {
        assert_eq!(SerialElementwise::new().name(), "SerialElementwise");
        assert_eq!(ParallelElementwise::new(64).name(), "ParallelElementwise");
    }
}
