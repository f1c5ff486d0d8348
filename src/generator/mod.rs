//! Synthetic test matrices for the solver.
//!
//! `MatrixGenerator` owns a seedable ChaCha8 stream, so a generator built from
//! the same seed produces the same sequence of matrices. Generated matrices
//! have a diagonal drawn from `[n-1, n+1]` and off-diagonal values drawn from
//! `[1, n/2]`, which keeps them diagonally dominant enough for the solver to
//! converge. Where the off-diagonal nonzeros go is decided by a
//! [`SparsityPolicy`].

use crate::error::{Result, expect};
use crate::matrix::Matrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::str::FromStr;

pub mod catalog;
pub mod source;

pub use catalog::Catalog;
pub use source::MatrixSource;

/// Rule for placing off-diagonal nonzeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SparsityPolicy {
    /// Every off-diagonal cell is independently nonzero with probability
    /// `density_percent / 100`.
    #[default]
    UniformRandom,
    /// Activity is decided once per off-diagonal block pair and applied to the
    /// whole block. Diagonal blocks are always populated.
    BlockConcentrated,
}

impl FromStr for SparsityPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" | "uniform-random" => Ok(SparsityPolicy::UniformRandom),
            "block" | "block-concentrated" => Ok(SparsityPolicy::BlockConcentrated),
            other => Err(format!("unknown sparsity policy '{}' (expected uniform or block)", other)),
        }
    }
}

impl fmt::Display for SparsityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SparsityPolicy::UniformRandom => write!(f, "uniform"),
            SparsityPolicy::BlockConcentrated => write!(f, "block"),
        }
    }
}

/// Right-hand side `[1, 2, ..., dimension]` as a column vector.
pub fn rhs(dimension: usize) -> Matrix<f64> {
    let values: Vec<f64> = (1..=dimension).map(|v| v as f64).collect();
    Matrix::column(&values)
}

/// Random matrix generator with explicit, seedable state.
pub struct MatrixGenerator<R = ChaCha8Rng> {
    rng: R,
    seed: Option<u64>,
}

impl MatrixGenerator<ChaCha8Rng> {
    /// Generator seeded with `seed`, or with a fresh seed from the thread RNG.
    ///
    /// The seed actually used is available from [`MatrixGenerator::seed`] so a
    /// failing case can be replayed.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        tracing::debug!(seed, "matrix generator seeded");
        Self { rng: ChaCha8Rng::seed_from_u64(seed), seed: Some(seed) }
    }
}

impl<R: Rng> MatrixGenerator<R> {
    /// Seed this generator was built from.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Mutable access to the underlying stream, for callers that draw case
    /// parameters from the same sequence.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Generate a `dimension x dimension` matrix.
    ///
    /// `block_size` only matters for [`SparsityPolicy::BlockConcentrated`],
    /// where it must divide `dimension`.
    pub fn generate(
        &mut self,
        dimension: usize,
        density_percent: u32,
        block_size: usize,
        policy: SparsityPolicy,
    ) -> Result<Matrix<f64>> {
        expect(dimension >= 1, || "matrix dimension must be at least 1".to_string())?;
        expect(density_percent <= 100, || {
            format!("density {}% is outside 0..=100", density_percent)
        })?;
        let _span = tracing::debug_span!("generate", dimension, density_percent, block_size, %policy).entered();

        let m = match policy {
            SparsityPolicy::UniformRandom => self.uniform(dimension, density_percent),
            SparsityPolicy::BlockConcentrated => {
                expect(block_size >= 1, || "block size must be at least 1".to_string())?;
                expect(dimension % block_size == 0, || {
                    format!("dimension {} is not divisible by block size {}", dimension, block_size)
                })?;
                self.block_concentrated(dimension, density_percent, block_size)
            }
        };
        tracing::debug!(nnz = m.nnz(), "matrix generated");
        Ok(m)
    }

    fn uniform(&mut self, n: usize, density: u32) -> Matrix<f64> {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                m[(i, j)] = if i == j {
                    self.diagonal_value(n)
                } else if self.hit(density) {
                    self.off_diagonal_value(n)
                } else {
                    0.0
                };
            }
        }
        m
    }

    fn block_concentrated(&mut self, n: usize, density: u32, bs: usize) -> Matrix<f64> {
        let nb = n / bs;
        let mut m = Matrix::zeros(n, n);
        for bi in 0..nb {
            for bj in 0..nb {
                if bi == bj {
                    for i in bi * bs..(bi + 1) * bs {
                        for j in bj * bs..(bj + 1) * bs {
                            if i == j {
                                m[(i, j)] = self.diagonal_value(n);
                            } else if self.hit(density) {
                                m[(i, j)] = self.off_diagonal_value(n);
                            }
                        }
                    }
                } else if self.hit(density) {
                    for i in bi * bs..(bi + 1) * bs {
                        for j in bj * bs..(bj + 1) * bs {
                            m[(i, j)] = self.off_diagonal_value(n);
                        }
                    }
                }
            }
        }
        m
    }

    /// Draw from `[n-1, n+1]`, never below 1.
    fn diagonal_value(&mut self, n: usize) -> f64 {
        let lo = n.saturating_sub(1).max(1);
        self.rng.gen_range(lo..=n + 1) as f64
    }

    /// Draw from `[1, n/2]`, never below 1.
    fn off_diagonal_value(&mut self, n: usize) -> f64 {
        self.rng.gen_range(1..=(n / 2).max(1)) as f64
    }

    fn hit(&mut self, density: u32) -> bool {
        self.rng.gen_range(0..100u32) < density
    }
}
