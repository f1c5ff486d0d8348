//! Size-encoding strings naming where a case's matrix comes from.
//!
//! - `catalog:<index>`: a literal matrix from [`Catalog`]
//! - `<dimension>`: a random matrix, block size 1
//! - `<dimension>:<block_size>`: a random matrix with the given block size

use crate::error::{HarnessError, Result};
use crate::generator::{Catalog, MatrixGenerator, SparsityPolicy};
use crate::matrix::Matrix;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSource {
    Catalog(Catalog),
    Random { dimension: usize, block_size: usize },
}

impl MatrixSource {
    pub fn dimension(&self) -> usize {
        match self {
            MatrixSource::Catalog(c) => c.dim(),
            MatrixSource::Random { dimension, .. } => *dimension,
        }
    }

    /// Catalog matrices are unblocked.
    pub fn block_size(&self) -> usize {
        match self {
            MatrixSource::Catalog(_) => 1,
            MatrixSource::Random { block_size, .. } => *block_size,
        }
    }

    /// Produce the matrix. `density_percent` and `policy` are ignored for
    /// catalog sources.
    pub fn realise<R: Rng>(
        &self,
        generator: &mut MatrixGenerator<R>,
        density_percent: u32,
        policy: SparsityPolicy,
    ) -> Result<Matrix<f64>> {
        match self {
            MatrixSource::Catalog(c) => Ok(c.matrix()),
            MatrixSource::Random { dimension, block_size } => {
                generator.generate(*dimension, density_percent, *block_size, policy)
            }
        }
    }
}

fn malformed(s: &str, why: &str) -> HarnessError {
    HarnessError::PreconditionViolation(format!("malformed size encoding '{}': {}", s, why))
}

fn parse_positive(s: &str, field: &str, what: &str) -> Result<usize> {
    match field.trim().parse::<usize>() {
        Ok(0) => Err(malformed(s, &format!("{} must be positive", what))),
        Ok(v) => Ok(v),
        Err(_) => Err(malformed(s, &format!("{} '{}' is not a number", what, field))),
    }
}

impl FromStr for MatrixSource {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(idx) = trimmed.strip_prefix("catalog:") {
            let index = idx
                .trim()
                .parse::<usize>()
                .map_err(|_| malformed(s, "catalog index is not a number"))?;
            return Ok(MatrixSource::Catalog(Catalog::from_index(index)?));
        }
        let (dim, block) = match trimmed.split_once(':') {
            Some((d, b)) => (d, Some(b)),
            None => (trimmed, None),
        };
        let dimension = parse_positive(s, dim, "dimension")?;
        let block_size = match block {
            Some(b) => parse_positive(s, b, "block size")?,
            None => 1,
        };
        if dimension % block_size != 0 {
            return Err(malformed(
                s,
                &format!("block size {} does not divide dimension {}", block_size, dimension),
            ));
        }
        Ok(MatrixSource::Random { dimension, block_size })
    }
}

impl fmt::Display for MatrixSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixSource::Catalog(c) => write!(f, "catalog:{}", c.index()),
            MatrixSource::Random { dimension, block_size: 1 } => write!(f, "{}", dimension),
            MatrixSource::Random { dimension, block_size } => write!(f, "{}:{}", dimension, block_size),
        }
    }
}
