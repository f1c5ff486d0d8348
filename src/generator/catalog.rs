//! Hand-authored matrices for deterministic cases.
//!
//! One asymmetric/symmetric pair per size (4x4 and 6x6). All of them are
//! strictly diagonally dominant so the solver converges on them.

use crate::error::{HarnessError, Result};
use crate::matrix::Matrix;

const ASYM4: [[f64; 4]; 4] = [
    [4.0, 0.0, 0.0, 1.0],
    [1.0, 4.0, 0.0, 0.0],
    [1.0, 0.0, 4.0, 0.0],
    [1.0, 0.0, 0.0, 4.0],
];

const SYM4: [[f64; 4]; 4] = [
    [4.0, 1.0, 0.0, 1.0],
    [1.0, 4.0, 0.0, 0.0],
    [0.0, 0.0, 4.0, 1.0],
    [1.0, 0.0, 1.0, 4.0],
];

const ASYM6: [[f64; 6]; 6] = [
    [6.0, 0.0, 1.0, 0.0, 0.0, 2.0],
    [1.0, 6.0, 0.0, 0.0, 1.0, 0.0],
    [0.0, 2.0, 6.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 6.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 6.0, 0.0],
    [0.0, 0.0, 2.0, 0.0, 1.0, 6.0],
];

const SYM6: [[f64; 6]; 6] = [
    [6.0, 1.0, 0.0, 0.0, 2.0, 0.0],
    [1.0, 6.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 6.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 6.0, 0.0, 2.0],
    [2.0, 0.0, 0.0, 0.0, 6.0, 0.0],
    [0.0, 0.0, 1.0, 2.0, 0.0, 6.0],
];

/// Closed set of catalog matrices, addressed by index `0..Catalog::LEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    /// Index 0: asymmetric 4x4.
    Asym4,
    /// Index 1: symmetric 4x4.
    Sym4,
    /// Index 2: asymmetric 6x6.
    Asym6,
    /// Index 3: symmetric 6x6.
    Sym6,
}

impl Catalog {
    pub const LEN: usize = 4;

    /// Bounds-checked lookup.
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Catalog::Asym4),
            1 => Ok(Catalog::Sym4),
            2 => Ok(Catalog::Asym6),
            3 => Ok(Catalog::Sym6),
            _ => Err(HarnessError::PreconditionViolation(format!(
                "unknown catalog matrix {} (valid indices are 0..{})",
                index,
                Self::LEN
            ))),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn dim(self) -> usize {
        match self {
            Catalog::Asym4 | Catalog::Sym4 => 4,
            Catalog::Asym6 | Catalog::Sym6 => 6,
        }
    }

    pub fn is_symmetric(self) -> bool {
        matches!(self, Catalog::Sym4 | Catalog::Sym6)
    }

    /// Fresh copy of the literal matrix.
    pub fn matrix(self) -> Matrix<f64> {
        let rows: Vec<Vec<f64>> = match self {
            Catalog::Asym4 => ASYM4.iter().map(|r| r.to_vec()).collect(),
            Catalog::Sym4 => SYM4.iter().map(|r| r.to_vec()).collect(),
            Catalog::Asym6 => ASYM6.iter().map(|r| r.to_vec()).collect(),
            Catalog::Sym6 => SYM6.iter().map(|r| r.to_vec()).collect(),
        };
        let n = rows.len();
        let mut m = Matrix::zeros(n, n);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }
}
