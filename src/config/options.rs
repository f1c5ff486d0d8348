//! Options for generating a case and running it against the solver.
//!
//! `GenOptions` describes what to generate and where to write it;
//! `RunOptions` describes how to drive the solver and how strictly to check
//! its output. The command line fills both, library callers can start from
//! `Default` and override fields.

use crate::generator::{MatrixSource, SparsityPolicy};
use crate::verify::Checks;
use std::path::PathBuf;

/// Thread-count variable exported to the solver by default.
pub const DEFAULT_THREAD_ENV: &str = "OMP_NUM_THREADS";

/// Case generation parameters.
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Catalog matrix or random `(dimension, block size)`
    pub source: MatrixSource,

    /// Percentage of off-diagonal cells (or blocks) made nonzero
    pub density_percent: u32,

    /// Placement of off-diagonal nonzeros
    pub policy: SparsityPolicy,

    /// ILU level of fill passed to the solver
    pub level: usize,

    /// Base name of the files written for the case
    pub root: String,

    /// Directory the case files are written to
    pub out_dir: PathBuf,

    /// RNG seed; a fresh one is drawn when absent
    pub seed: Option<u64>,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            source: MatrixSource::Random { dimension: 12, block_size: 1 },
            density_percent: 20,
            policy: SparsityPolicy::UniformRandom,
            level: 0,
            root: "spiluk".to_string(),
            out_dir: PathBuf::from("."),
            seed: None,
        }
    }
}

/// Solver invocation and verification parameters.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path to the solver executable
    pub solver: PathBuf,

    /// Arguments placed before the config path (e.g. for a launcher)
    pub solver_args: Vec<String>,

    /// Environment variable carrying the thread count
    pub thread_env: String,

    /// Thread counts to sweep; empty runs once without setting the variable
    pub threads: Vec<usize>,

    /// Tolerance for factor comparison
    pub tolerance: f64,

    /// Checks applied to the factors
    pub checks: Checks,

    /// Keep the matrix and config files after the run
    pub keep_files: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            solver: PathBuf::new(),
            solver_args: Vec::new(),
            thread_env: DEFAULT_THREAD_ENV.to_string(),
            threads: Vec::new(),
            tolerance: 1e-8,
            checks: Checks::all(),
            keep_files: true,
        }
    }
}

/// Thread counts `1..=max` for a sweep.
pub fn thread_sweep(max: usize) -> Vec<usize> {
    (1..=max.max(1)).collect()
}

/// Default upper bound for a thread sweep: the number of logical CPUs.
pub fn default_max_threads() -> usize {
    num_cpus::get()
}
