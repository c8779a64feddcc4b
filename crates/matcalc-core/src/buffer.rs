//! Owned matrix storage and borrowed quadrant views.
//!
//! A `Matrix` owns one contiguous row-major buffer. Slicing never copies:
//! `MatrixView` and `MatrixViewMut` carry an explicit stride, so a quadrant
//! view aliases the parent buffer directly. A view can never outlive the
//! buffer it borrows.

use rayon::prelude::*;

use crate::multiplier::MatError;

/// One of the four n/2×n/2 blocks obtained by splitting a matrix at its
/// midpoint on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// Rows 0..n/2, columns 0..n/2.
    TopLeft,
    /// Rows 0..n/2, columns n/2..n.
    TopRight,
    /// Rows n/2..n, columns 0..n/2.
    BottomLeft,
    /// Rows n/2..n, columns n/2..n.
    BottomRight,
}

impl Quadrant {
    /// Row and column offsets of this quadrant in a matrix split at `half`.
    fn offsets(self, half: usize) -> (usize, usize) {
        match self {
            Quadrant::TopLeft => (0, 0),
            Quadrant::TopRight => (0, half),
            Quadrant::BottomLeft => (half, 0),
            Quadrant::BottomRight => (half, half),
        }
    }
}

/// Square matrix owning contiguous row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Allocate a zero-filled n×n matrix.
    ///
    /// Fails with `InvalidInput` for n = 0 (nothing is allocated) and with
    /// `Allocation` when the buffer cannot be reserved.
    pub fn zeros(n: usize) -> Result<Self, MatError> {
        if n == 0 {
            return Err(MatError::InvalidInput(
                "matrix dimension must be positive".into(),
            ));
        }
        let len = n
            .checked_mul(n)
            .ok_or_else(|| MatError::Allocation(format!("dimension {n} overflows element count")))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| MatError::Allocation(format!("cannot reserve {len} elements: {e}")))?;
        data.resize(len, 0.0);
        Ok(Self { n, data })
    }

    /// The n×n identity matrix.
    pub fn identity(n: usize) -> Result<Self, MatError> {
        let mut m = Self::zeros(n)?;
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        Ok(m)
    }

    /// Build a matrix from row-major data of length n².
    pub fn from_vec(n: usize, data: Vec<f64>) -> Result<Self, MatError> {
        if n == 0 {
            return Err(MatError::InvalidInput(
                "matrix dimension must be positive".into(),
            ));
        }
        if data.len() != n * n {
            return Err(MatError::Dimension(format!(
                "expected {} elements for a {n}x{n} matrix, got {}",
                n * n,
                data.len()
            )));
        }
        Ok(Self { n, data })
    }

    /// Matrix dimension n.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Element at (row, col).
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Set the element at (row, col).
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    /// Row-major element slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Borrow the whole matrix as a read-only view.
    #[must_use]
    pub fn as_view(&self) -> MatrixView<'_> {
        MatrixView {
            data: &self.data,
            n: self.n,
            stride: self.n,
        }
    }

    /// Borrow the whole matrix as a mutable view.
    pub fn as_view_mut(&mut self) -> MatrixViewMut<'_> {
        MatrixViewMut {
            data: &mut self.data,
            n: self.n,
            stride: self.n,
        }
    }

    /// Largest absolute element value.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Largest absolute elementwise difference, or `None` on dimension
    /// mismatch.
    #[must_use]
    pub fn max_abs_diff(&self, other: &Self) -> Option<f64> {
        if self.n != other.n {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .fold(0.0_f64, |m, (x, y)| m.max((x - y).abs())),
        )
    }

    /// Whether every element matches `other` within an absolute tolerance.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.max_abs_diff(other).is_some_and(|d| d <= tol)
    }
}

/// Read-only view of an n×n block inside a row-major buffer.
#[derive(Clone, Copy)]
pub struct MatrixView<'a> {
    data: &'a [f64],
    n: usize,
    stride: usize,
}

impl<'a> MatrixView<'a> {
    /// View a contiguous n×n buffer.
    #[must_use]
    pub fn from_slice(data: &'a [f64], n: usize) -> Self {
        debug_assert!(data.len() >= n * n);
        Self { data, n, stride: n }
    }

    /// View dimension n.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Element at (row, col).
    #[inline]
    #[must_use]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.stride + j]
    }

    /// Row `i` as a slice of length n.
    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> &'a [f64] {
        let start = i * self.stride;
        &self.data[start..start + self.n]
    }

    /// Zero-copy view of one quadrant; shares the parent stride.
    #[must_use]
    pub fn quadrant(&self, q: Quadrant) -> MatrixView<'a> {
        debug_assert!(self.n % 2 == 0);
        let half = self.n / 2;
        let (ro, co) = q.offsets(half);
        MatrixView {
            data: &self.data[ro * self.stride + co..],
            n: half,
            stride: self.stride,
        }
    }
}

/// Mutable view of an n×n block inside a row-major buffer.
pub struct MatrixViewMut<'a> {
    data: &'a mut [f64],
    n: usize,
    stride: usize,
}

impl<'a> MatrixViewMut<'a> {
    /// Mutably view a contiguous n×n buffer.
    pub fn from_slice(data: &'a mut [f64], n: usize) -> Self {
        debug_assert!(data.len() >= n * n);
        Self { data, n, stride: n }
    }

    /// View dimension n.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Element at (row, col).
    #[inline]
    #[must_use]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.stride + j]
    }

    /// Set the element at (row, col).
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.stride + j] = value;
    }

    /// Mutable zero-copy view of one quadrant; shares the parent stride.
    pub fn quadrant_mut(&mut self, q: Quadrant) -> MatrixViewMut<'_> {
        debug_assert!(self.n % 2 == 0);
        let half = self.n / 2;
        let (ro, co) = q.offsets(half);
        let stride = self.stride;
        MatrixViewMut {
            data: &mut self.data[ro * stride + co..],
            n: half,
            stride,
        }
    }

    /// Iterate over rows as mutable slices of length n.
    pub fn rows_mut<'s>(&'s mut self) -> impl Iterator<Item = &'s mut [f64]> {
        let n = self.n;
        self.data
            .chunks_mut(self.stride)
            .take(n)
            .map(move |row| &mut row[..n])
    }

    /// Parallel iterator over rows as mutable slices of length n.
    pub fn par_rows_mut<'s>(&'s mut self) -> impl IndexedParallelIterator<Item = &'s mut [f64]> {
        let n = self.n;
        self.data
            .par_chunks_mut(self.stride)
            .take(n)
            .map(move |row| &mut row[..n])
    }

    /// Copy every element from an equal-sized source view.
    pub fn copy_from(&mut self, src: MatrixView<'_>) {
        debug_assert_eq!(self.n, src.dim());
        for (i, row) in self.rows_mut().enumerate() {
            row.copy_from_slice(src.row(i));
        }
    }
}
