//! Reference ILU(k) factorization with level-of-fill control (Saad §10.3).
//!
//! # Overview
//!
//! Level-of-fill bookkeeping starts from the pattern of `A` (level 0) and
//! assigns every fill entry the level `lev(i,k) + lev(k,j) + 1`. Entries whose
//! level exceeds `k` are dropped at the end of each row. With `k >= n` nothing
//! is ever dropped and the result is the exact LU factorization without
//! pivoting.
//!
//! The factors are returned dense: `L` unit lower triangular with the ones
//! stored explicitly, `U` upper triangular. At the dimensions the harness
//! works with this is simpler than a sparse-row layout and makes comparison
//! with the solver's output a cell-by-cell affair.
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, Algorithm 10.5.

use crate::error::{HarnessError, Result, expect};
use crate::matrix::Matrix;

/// Level assigned to cells outside the pattern.
const UNREACHED: usize = usize::MAX;

/// ILU(k) factors of a square matrix.
#[derive(Clone, Debug)]
pub struct IlukFactors {
    pub level: usize,
    pub l: Matrix<f64>,
    pub u: Matrix<f64>,
    /// Fill level of every kept entry; `usize::MAX` marks dropped cells.
    pub levels: Vec<Vec<usize>>,
}

/// Compute ILU(`level`) of `a`.
pub fn iluk(a: &Matrix<f64>, level: usize) -> Result<IlukFactors> {
    expect(a.is_square(), || format!("ILU(k) needs a square matrix, got {}x{}", a.nrows(), a.ncols()))?;
    let n = a.dim();
    let _span = tracing::debug_span!("iluk", n, level).entered();

    let mut lev = vec![vec![UNREACHED; n]; n];
    let mut w = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            if a[(i, j)] != 0.0 || i == j {
                lev[i][j] = 0;
                w[i][j] = a[(i, j)];
            }
        }
    }

    for i in 0..n {
        for k in 0..i {
            if lev[i][k] > level {
                continue;
            }
            let pivot = w[k][k];
            if pivot == 0.0 {
                return Err(HarnessError::Factor(format!("ILU({}): zero pivot at row {}", level, k)));
            }
            let lik = w[i][k] / pivot;
            w[i][k] = lik;
            for j in (k + 1)..n {
                if lev[k][j] == UNREACHED {
                    continue;
                }
                let new_level = lev[i][k].saturating_add(lev[k][j]).saturating_add(1);
                lev[i][j] = lev[i][j].min(new_level);
                w[i][j] -= lik * w[k][j];
            }
        }
        // drop row i's entries above the fill level
        for j in 0..n {
            if lev[i][j] > level {
                lev[i][j] = UNREACHED;
                w[i][j] = 0.0;
            }
        }
    }

    let mut l = Matrix::zeros(n, n);
    let mut u = Matrix::zeros(n, n);
    for i in 0..n {
        l[(i, i)] = 1.0;
        for j in 0..n {
            if j < i {
                l[(i, j)] = w[i][j];
            } else {
                u[(i, j)] = w[i][j];
            }
        }
    }
    Ok(IlukFactors { level, l, u, levels: lev })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiag(n: usize) -> Matrix<f64> {
        let mut a = Matrix::zeros(n, n);
        for i in 0..n {
            a[(i, i)] = 2.0;
            if i > 0 {
                a[(i, i - 1)] = -1.0;
                a[(i - 1, i)] = -1.0;
            }
        }
        a
    }

    #[test]
    fn identity_factors_to_itself() {
        let mut a = Matrix::zeros(3, 3);
        for i in 0..3 {
            a[(i, i)] = 1.0;
        }
        let f = iluk(&a, 0).unwrap();
        assert_eq!(f.l, a);
        assert_eq!(f.u, a);
    }

    #[test]
    fn tridiagonal_has_no_fill() {
        // ILU(0) of a tridiagonal matrix is its exact LU
        let a = tridiag(4);
        let f = iluk(&a, 0).unwrap();
        assert!((f.u[(0, 0)] - 2.0).abs() < 1e-12);
        assert!((f.l[(1, 0)] + 0.5).abs() < 1e-12);
        assert!((f.u[(1, 1)] - 1.5).abs() < 1e-12);
        assert_eq!(f.l[(2, 0)], 0.0);
        assert_eq!(f.u[(0, 2)], 0.0);
    }

    #[test]
    fn arrow_matrix_fill_is_level_one() {
        // first row and column dense: every (i, j) with i, j > 0 fills at level 1
        let n = 4;
        let mut a = Matrix::zeros(n, n);
        for i in 0..n {
            a[(i, i)] = 4.0;
            a[(0, i)] = 1.0;
            a[(i, 0)] = 1.0;
        }
        a[(0, 0)] = 4.0;
        let f0 = iluk(&a, 0).unwrap();
        assert_eq!(f0.u[(1, 2)], 0.0);
        let f1 = iluk(&a, 1).unwrap();
        assert_eq!(f1.levels[1][2], 1);
        assert!((f1.u[(1, 2)] + 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_pivot_is_a_factor_error() {
        let a = Matrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
        assert!(matches!(iluk(&a, 0), Err(HarnessError::Factor(_))));
    }
}
