//! Block transcoder: split a square matrix into a grid of equal square blocks
//! and reassemble it.
//!
//! Cell `(i, j)` of an `n x n` matrix with block size `b` lives in block
//! `(i / b, j / b)` at offset `(i % b, j % b)`. The grid owns copies of every
//! block, and `unblock(&blockize(&m, b)?, b)? == m` holds exactly since no
//! arithmetic is involved.

use crate::error::{Result, expect};
use crate::matrix::dense::Matrix;
use num_traits::Zero;

/// Square grid of `block_size x block_size` sub-matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockGrid<T> {
    grid_dim: usize,
    block_size: usize,
    // row-major by (block_row, block_col)
    blocks: Vec<Matrix<T>>,
}

impl<T: Copy + Zero> BlockGrid<T> {
    /// Grid of all-zero blocks.
    pub fn zeros(grid_dim: usize, block_size: usize) -> Self {
        Self {
            grid_dim,
            block_size,
            blocks: vec![Matrix::zeros(block_size, block_size); grid_dim * grid_dim],
        }
    }
}

impl<T> BlockGrid<T> {
    /// Number of blocks along each side.
    pub fn grid_dim(&self) -> usize {
        self.grid_dim
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn offset(&self, bi: usize, bj: usize) -> usize {
        assert!(bi < self.grid_dim && bj < self.grid_dim, "block ({}, {}) out of bounds", bi, bj);
        bi * self.grid_dim + bj
    }

    /// Block at `(bi, bj)`. Panics if either index is outside the grid.
    pub fn block(&self, bi: usize, bj: usize) -> &Matrix<T> {
        &self.blocks[self.offset(bi, bj)]
    }

    pub fn block_mut(&mut self, bi: usize, bj: usize) -> &mut Matrix<T> {
        let k = self.offset(bi, bj);
        &mut self.blocks[k]
    }
}

impl<T: Copy + Zero> BlockGrid<T> {
    /// True when every entry of block `(bi, bj)` is zero.
    pub fn is_zero_block(&self, bi: usize, bj: usize) -> bool {
        self.block(bi, bj).nnz() == 0
    }
}

fn check_block_size(dim: usize, block_size: usize) -> Result<()> {
    expect(block_size >= 1, || "block size must be at least 1".to_string())?;
    expect(dim % block_size == 0, || {
        format!("dimension {} is not divisible by block size {}", dim, block_size)
    })
}

/// Split `matrix` into a grid of `block_size x block_size` blocks.
pub fn blockize<T: Copy + Zero>(matrix: &Matrix<T>, block_size: usize) -> Result<BlockGrid<T>> {
    expect(matrix.is_square(), || {
        format!("cannot blockize a {}x{} matrix", matrix.nrows(), matrix.ncols())
    })?;
    let n = matrix.dim();
    check_block_size(n, block_size)?;
    let mut grid = BlockGrid::zeros(n / block_size, block_size);
    for i in 0..n {
        for j in 0..n {
            let (bi, bj) = (i / block_size, j / block_size);
            let (oi, oj) = (i % block_size, j % block_size);
            grid.block_mut(bi, bj)[(oi, oj)] = matrix[(i, j)];
        }
    }
    Ok(grid)
}

/// Reassemble a flat matrix from `grid`.
pub fn unblock<T: Copy + Zero>(grid: &BlockGrid<T>, block_size: usize) -> Result<Matrix<T>> {
    expect(block_size == grid.block_size(), || {
        format!(
            "block size {} does not match the grid's block size {}",
            block_size,
            grid.block_size()
        )
    })?;
    check_block_size(grid.grid_dim() * block_size, block_size)?;
    let n = grid.grid_dim() * block_size;
    let mut result = Matrix::zeros(n, n);
    for bi in 0..grid.grid_dim() {
        for bj in 0..grid.grid_dim() {
            let block = grid.block(bi, bj);
            for oi in 0..block_size {
                for oj in 0..block_size {
                    result[(bi * block_size + oi, bj * block_size + oj)] = block[(oi, oj)];
                }
            }
        }
    }
    Ok(result)
}
