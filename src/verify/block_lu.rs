//! Closed-form block LU for a matrix split into exactly three diagonal blocks.
//!
//! With `A` partitioned as a 3x3 grid of `b x b` blocks, the factors are
//!
//! ```text
//! L = [ I          ]     U = [ U11 U12 U13 ]
//!     [ L21 I      ]         [     U22 U23 ]
//!     [ L31 L32 I  ]         [         U33 ]
//!
//! U11 = A11, U12 = A12, U13 = A13
//! L21 = A21 U11⁻¹, L31 = A31 U11⁻¹
//! U22 = A22 - L21 A12, U23 = A23 - L21 A13
//! L32 = (A32 - L31 A12) U22⁻¹
//! U33 = A33 - L31 A13 - L32 U23
//! ```
//!
//! This is what a blocked ILU with full fill produces on a three-block
//! matrix. Dense inverses of the pivot blocks use faer's full-pivoting LU.

use crate::error::{HarnessError, Result, expect};
use crate::matrix::{BlockGrid, Matrix, blockize, unblock};
use faer::linalg::solvers::{FullPivLu, SolveCore};
use faer::{Conj, Mat};

/// Relative residual above which a pivot block counts as singular.
const SINGULAR_TOL: f64 = 1e-8;

/// Invert a pivot block, rejecting singular ones.
fn invert(a: &Mat<f64>, name: &str) -> Result<Mat<f64>> {
    let n = a.nrows();
    let lu = FullPivLu::new(a.as_ref());
    let mut inv = Mat::<f64>::identity(n, n);
    lu.solve_in_place_with_conj(Conj::No, inv.as_mut());

    let check = a * &inv;
    let mut worst = 0.0f64;
    for i in 0..n {
        for j in 0..n {
            let target = if i == j { 1.0 } else { 0.0 };
            let r = (check[(i, j)] - target).abs();
            if !r.is_finite() {
                worst = f64::INFINITY;
            } else {
                worst = worst.max(r);
            }
        }
    }
    if worst > SINGULAR_TOL {
        return Err(HarnessError::Factor(format!(
            "pivot block {} is singular (inverse residual {:e})",
            name, worst
        )));
    }
    Ok(inv)
}

/// Block LU factors `(L, U)` of `a` with `a.dim() == 3 * block_size`.
pub fn block_lu3(a: &Matrix<f64>, block_size: usize) -> Result<(Matrix<f64>, Matrix<f64>)> {
    let grid = blockize(a, block_size)?;
    expect(grid.grid_dim() == 3, || {
        format!(
            "block LU needs exactly three diagonal blocks, got {} (dimension {}, block size {})",
            grid.grid_dim(),
            a.dim(),
            block_size
        )
    })?;
    let _span = tracing::debug_span!("block_lu3", block_size).entered();

    let blk = |bi: usize, bj: usize| grid.block(bi, bj).to_faer();
    let (a11, a12, a13) = (blk(0, 0), blk(0, 1), blk(0, 2));
    let (a21, a22, a23) = (blk(1, 0), blk(1, 1), blk(1, 2));
    let (a31, a32, a33) = (blk(2, 0), blk(2, 1), blk(2, 2));

    let inv11 = invert(&a11, "A11")?;
    let l21 = &a21 * &inv11;
    let l31 = &a31 * &inv11;

    let l21_a12 = &l21 * &a12;
    let u22 = &a22 - &l21_a12;
    let l21_a13 = &l21 * &a13;
    let u23 = &a23 - &l21_a13;

    let inv22 = invert(&u22, "U22")?;
    let l31_a12 = &l31 * &a12;
    let s32 = &a32 - &l31_a12;
    let l32 = &s32 * &inv22;

    let l31_a13 = &l31 * &a13;
    let l32_u23 = &l32 * &u23;
    let s33 = &a33 - &l31_a13;
    let u33 = &s33 - &l32_u23;

    let mut lower = BlockGrid::zeros(3, block_size);
    let mut upper = BlockGrid::zeros(3, block_size);
    for d in 0..3 {
        let eye = lower.block_mut(d, d);
        for k in 0..block_size {
            eye[(k, k)] = 1.0;
        }
    }
    *lower.block_mut(1, 0) = Matrix::from_faer(&l21);
    *lower.block_mut(2, 0) = Matrix::from_faer(&l31);
    *lower.block_mut(2, 1) = Matrix::from_faer(&l32);

    *upper.block_mut(0, 0) = Matrix::from_faer(&a11);
    *upper.block_mut(0, 1) = Matrix::from_faer(&a12);
    *upper.block_mut(0, 2) = Matrix::from_faer(&a13);
    *upper.block_mut(1, 1) = Matrix::from_faer(&u22);
    *upper.block_mut(1, 2) = Matrix::from_faer(&u23);
    *upper.block_mut(2, 2) = Matrix::from_faer(&u33);

    Ok((unblock(&lower, block_size)?, unblock(&upper, block_size)?))
}
