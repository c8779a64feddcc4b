//! Direct O(n³) multiplication, used standalone and at the recursion base
//! case.

use crate::buffer::{Matrix, MatrixView, MatrixViewMut};
use crate::multiplier::{CoreMultiplier, MatError};
use crate::observer::ProgressObserver;
use crate::options::Options;
use crate::progress::{CancellationToken, ProgressUpdate};

/// `out[i][j] = Σ_k a[i][k] * b[k][j]`, accumulated in increasing-k order.
///
/// The fixed accumulation order pins down rounding, so every engine that
/// bottoms out here produces identical base-case blocks.
pub fn multiply_into(
    a: MatrixView<'_>,
    b: MatrixView<'_>,
    mut out: MatrixViewMut<'_>,
) -> Result<(), MatError> {
    let n = a.dim();
    if b.dim() != n || out.dim() != n {
        return Err(MatError::Dimension(format!(
            "multiply operands must share one dimension: {} vs {} vs {}",
            n,
            b.dim(),
            out.dim()
        )));
    }
    for i in 0..n {
        let ra = a.row(i);
        for j in 0..n {
            let mut acc = 0.0;
            for (k, &aik) in ra.iter().enumerate() {
                acc += aik * b.at(k, j);
            }
            out.set(i, j, acc);
        }
    }
    Ok(())
}

/// Direct multiplication as a registry algorithm.
pub struct NaiveCore;

impl NaiveCore {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for NaiveCore {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreMultiplier for NaiveCore {
    fn multiply_core(
        &self,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
        calc_index: usize,
        a: &Matrix,
        b: &Matrix,
        _opts: &Options,
    ) -> Result<Matrix, MatError> {
        cancel.check_cancelled()?;
        let mut out = Matrix::zeros(a.dim())?;
        multiply_into(a.as_view(), b.as_view(), out.as_view_mut())?;
        observer.on_progress(&ProgressUpdate::done(calc_index, self.name()));
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "Naive"
    }
}
