//! spiluk-harness: test harness for an external sparse ILU(k) solver
//!
//! This crate generates synthetic test matrices (from a fixed catalog or at random, with
//! uniform or block-concentrated sparsity), splits them into block grids and back, writes
//! them in Matrix-Market form with a templated XML configuration, drives the solver
//! executable and checks the factors it writes against in-process references.

pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod harness;
pub mod io;
pub mod matrix;
pub mod runner;
pub mod verify;

// Re-exports for convenience
pub use config::{ConfigTemplate, GenOptions, RunOptions};
pub use self::core::{MatShape, MatrixGet};
pub use error::{HarnessError, Result};
pub use generator::{Catalog, MatrixGenerator, MatrixSource, SparsityPolicy};
pub use matrix::{BlockGrid, Matrix, blockize, unblock};
pub use verify::{Checks, Reference, VerifyReport, verify_factors};
