//! Checking the solver's factors against an in-process reference.
//!
//! The reference depends on how the case was blocked:
//!
//! - block size 1: point ILU(k) at the case's level ([`iluk`]),
//! - three diagonal blocks and level >= 2 (full fill): closed-form block LU
//!   ([`block_lu3`]),
//! - anything else: no reference factors, only the product check.
//!
//! The product check compares `L * U` with `A` on the nonzero pattern of `A`,
//! where any incomplete factorization must reproduce `A`.

use crate::core::traits::{MatShape, MatrixGet};
use crate::error::{HarnessError, Result};
use crate::matrix::Matrix;
use bitflags::bitflags;
use std::fmt;

pub mod block_lu;
pub mod iluk;

pub use block_lu::block_lu3;
pub use iluk::{IlukFactors, iluk};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Checks: u32 {
        const LOWER   = 0b001;
        const UPPER   = 0b010;
        const FACTORS = Self::LOWER.bits() | Self::UPPER.bits();
        const PRODUCT = 0b100;
    }
}

impl fmt::Display for Checks {
    /// Lowercase flag names joined by `+`, e.g. `lower+upper`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter_names().map(|(name, _)| name.to_ascii_lowercase()).collect();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

/// Reference the solver's factors are compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    PointIluk { level: usize },
    BlockLu3 { block_size: usize },
    PatternOnly,
}

impl Reference {
    pub fn select(dimension: usize, block_size: usize, level: usize) -> Self {
        if block_size <= 1 {
            Reference::PointIluk { level }
        } else if dimension == 3 * block_size && level >= 2 {
            Reference::BlockLu3 { block_size }
        } else {
            Reference::PatternOnly
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::PointIluk { level } => write!(f, "ILU({})", level),
            Reference::BlockLu3 { block_size } => write!(f, "block LU (3 blocks of {})", block_size),
            Reference::PatternOnly => write!(f, "pattern-only"),
        }
    }
}

/// Worst disagreement found by a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    pub row: usize,
    pub col: usize,
    pub expected: f64,
    pub actual: f64,
}

impl Deviation {
    pub fn abs(&self) -> f64 {
        (self.expected - self.actual).abs()
    }

    /// Within `tol`, relative to the expected magnitude once it exceeds 1.
    pub fn within(&self, tol: f64) -> bool {
        self.abs() <= tol * self.expected.abs().max(1.0)
    }
}

fn worse(a: Option<Deviation>, b: Option<Deviation>) -> Option<Deviation> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if y.abs() > x.abs() || y.abs().is_nan() { y } else { x }),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Largest cell-wise deviation between `expected` and `actual`, optionally
/// restricted to the nonzero cells of `mask`.
pub fn max_deviation<A, B>(expected: &A, actual: &B, mask: Option<&Matrix<f64>>) -> Result<Option<Deviation>>
where
    A: MatrixGet<f64> + MatShape + Sync,
    B: MatrixGet<f64> + MatShape + Sync,
{
    if expected.nrows() != actual.nrows() || expected.ncols() != actual.ncols() {
        return Err(HarnessError::Verification(format!(
            "shape mismatch: expected {}x{}, got {}x{}",
            expected.nrows(),
            expected.ncols(),
            actual.nrows(),
            actual.ncols()
        )));
    }
    let ncols = expected.ncols();
    let row_worst = |i: usize| -> Option<Deviation> {
        (0..ncols)
            .filter(|&j| mask.is_none_or(|m| m[(i, j)] != 0.0))
            .map(|j| Deviation { row: i, col: j, expected: expected.get(i, j), actual: actual.get(i, j) })
            .fold(None, |acc, d| worse(acc, Some(d)))
    };
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        Ok((0..expected.nrows()).into_par_iter().map(row_worst).reduce(|| None, worse))
    }
    #[cfg(not(feature = "rayon"))]
    {
        Ok((0..expected.nrows()).map(row_worst).fold(None, worse))
    }
}

/// Treat an `L` written without its unit diagonal as if the ones were there.
pub fn with_unit_diagonal(l: &Matrix<f64>) -> Matrix<f64> {
    let n = l.nrows().min(l.ncols());
    if (0..n).all(|i| l[(i, i)] == 0.0) {
        let mut out = l.clone();
        for i in 0..n {
            out[(i, i)] = 1.0;
        }
        out
    } else {
        l.clone()
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub reference: Reference,
    /// Worst deviation of every check that ran.
    pub deviations: Vec<(Checks, Option<Deviation>)>,
}

fn check_one(
    name: Checks,
    dev: Option<Deviation>,
    tol: f64,
    report: &mut VerifyReport,
) -> Result<()> {
    if let Some(d) = dev {
        if !d.within(tol) {
            return Err(HarnessError::Verification(format!(
                "{} check against {} failed at ({}, {}): expected {}, got {} (|diff| = {:e}, tol = {:e})",
                name, report.reference, d.row, d.col, d.expected, d.actual, d.abs(), tol
            )));
        }
    }
    report.deviations.push((name, dev));
    Ok(())
}

/// Verify solver factors `l`, `u` of `a`.
pub fn verify_factors(
    a: &Matrix<f64>,
    l: &Matrix<f64>,
    u: &Matrix<f64>,
    level: usize,
    block_size: usize,
    checks: Checks,
    tol: f64,
) -> Result<VerifyReport> {
    let reference = Reference::select(a.dim(), block_size, level);
    let _span = tracing::info_span!("verify", %reference).entered();
    let l = with_unit_diagonal(l);
    let mut report = VerifyReport { reference, deviations: Vec::new() };

    let expected = match reference {
        Reference::PointIluk { level } => {
            let f = iluk(a, level)?;
            Some((f.l, f.u))
        }
        Reference::BlockLu3 { block_size } => Some(block_lu3(a, block_size)?),
        Reference::PatternOnly => None,
    };

    if let Some((ref_l, ref_u)) = &expected {
        if checks.contains(Checks::LOWER) {
            check_one(Checks::LOWER, max_deviation(ref_l, &l, None)?, tol, &mut report)?;
        }
        if checks.contains(Checks::UPPER) {
            check_one(Checks::UPPER, max_deviation(ref_u, u, None)?, tol, &mut report)?;
        }
    }
    if checks.contains(Checks::PRODUCT) {
        if l.ncols() != u.nrows() {
            return Err(HarnessError::Verification(format!(
                "cannot multiply a {}x{} L by a {}x{} U",
                l.nrows(),
                l.ncols(),
                u.nrows(),
                u.ncols()
            )));
        }
        let lu = &l.to_faer() * &u.to_faer();
        check_one(Checks::PRODUCT, max_deviation(a, &lu, Some(a))?, tol, &mut report)?;
    }
    tracing::info!(checks = report.deviations.len(), "factors verified");
    Ok(report)
}
