//! Core matrix-access traits for the harness.

/// Shape of a two-dimensional matrix.
pub trait MatShape {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;

    /// True when `nrows() == ncols()`.
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

/// Read access to entry `(i, j)`.
pub trait MatrixGet<T> {
    fn get(&self, i: usize, j: usize) -> T;
}
