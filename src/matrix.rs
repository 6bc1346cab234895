//! Generic row-major numeric matrices for image interchange.
//!
//! [`Image::from_matrix`](crate::Image::from_matrix) and
//! [`Image::to_matrix`](crate::Image::to_matrix) accept anything implementing
//! [`RowMajorMatrix`]; [`Matrix`] is the concrete implementation shipped with
//! the crate.

use crate::util::{CowImageError, CowImageResult};

/// A dense row-major matrix of copyable elements.
pub trait RowMajorMatrix {
    /// Element type.
    type Elem: Copy;

    /// Number of rows.
    fn rows(&self) -> usize;
    /// Number of columns.
    fn cols(&self) -> usize;
    /// Element at `(row, col)`; both must be in range.
    fn get(&self, row: usize, col: usize) -> Self::Elem;
    /// Builds a matrix by evaluating `f` at every `(row, col)`.
    fn from_fn(rows: usize, cols: usize, f: impl FnMut(usize, usize) -> Self::Elem) -> Self
    where
        Self: Sized;
}

/// Owned row-major matrix backed by one contiguous vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    /// Wraps a row-major vector; `data.len()` must equal `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> CowImageResult<Self> {
        let expected = rows.checked_mul(cols);
        if expected != Some(data.len()) {
            return Err(CowImageError::InvalidMatrix { rows, cols });
        }
        Ok(Self { rows, cols, data })
    }

    /// The backing row-major data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Contiguous slice of one row.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.data[start..start + self.cols])
    }
}

impl<T: Copy> RowMajorMatrix for Matrix<T> {
    type Elem = T;

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }
}
