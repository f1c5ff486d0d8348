//! Row-major dense matrix used throughout the harness.
//!
//! `Matrix<T>` is the value the generator produces, the transcoder splits into
//! blocks and the Matrix-Market layer reads and writes. A column vector is a
//! `Matrix` with one column. Conversions to and from `faer::Mat` let the
//! verification code hand matrices to faer's dense factorizations.

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::{Result, expect};
use faer::Mat;
use num_traits::Zero;
use std::ops::{Index, IndexMut};

/// Dense matrix stored row by row.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    nrows: usize,
    ncols: usize,
    data: Vec<T>,
}

impl<T: Copy + Zero> Matrix<T> {
    /// All-zero `nrows x ncols` matrix. Panics if the entry count overflows.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        let len = match nrows.checked_mul(ncols) {
            Some(len) => len,
            None => panic!("matrix size {}x{} overflows", nrows, ncols),
        };
        Self { nrows, ncols, data: vec![T::zero(); len] }
    }

    /// Build from a sequence of rows. Fails if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for (i, row) in rows.into_iter().enumerate() {
            expect(row.len() == ncols, || {
                format!("row {} has length {}, expected {}", i, row.len(), ncols)
            })?;
            data.extend(row);
        }
        Ok(Self { nrows, ncols, data })
    }

    /// Column vector from a slice of values.
    pub fn column(values: &[T]) -> Self {
        Self { nrows: values.len(), ncols: 1, data: values.to_vec() }
    }

    /// Number of entries different from zero.
    pub fn nnz(&self) -> usize {
        self.data.iter().filter(|v| !v.is_zero()).count()
    }

    /// Nonzero entries as `(row, col, value)` in row-major scan order.
    pub fn nonzeros(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let ncols = self.ncols;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_zero())
            .map(move |(k, &v)| (k / ncols, k % ncols, v))
    }
}

impl<T> Matrix<T> {
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Side length of a square matrix.
    pub fn dim(&self) -> usize {
        self.nrows
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics; an empty-column matrix has no rows to yield anyway
        self.data.chunks(self.ncols.max(1)).take(self.nrows)
    }

    /// Row-major storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Copy> Matrix<T> {
    /// Nested-row copy of the matrix.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }

    /// Copy into a faer matrix.
    pub fn to_faer(&self) -> Mat<T> {
        Mat::from_fn(self.nrows, self.ncols, |i, j| self[(i, j)])
    }

    /// Copy out of a faer matrix.
    pub fn from_faer(m: &Mat<T>) -> Self {
        let (nrows, ncols) = (m.nrows(), m.ncols());
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(m[(i, j)]);
            }
        }
        Self { nrows, ncols, data }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.nrows && j < self.ncols, "index ({}, {}) out of bounds", i, j);
        &self.data[i * self.ncols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.nrows && j < self.ncols, "index ({}, {}) out of bounds", i, j);
        &mut self.data[i * self.ncols + j]
    }
}

impl<T> MatShape for Matrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
}

impl<T: Copy> MatrixGet<T> for Matrix<T> {
    fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }
}

impl<T> MatShape for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }
    fn ncols(&self) -> usize {
        self.ncols()
    }
}

impl<T: Copy> MatrixGet<T> for Mat<T> {
    fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }
}
