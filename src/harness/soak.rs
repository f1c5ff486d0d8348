//! Soak loop: many random cases against the same solver.
//!
//! Case parameters come from a master ChaCha8 stream seeded by the base
//! options, and every case carries its own seed, so any failing iteration can
//! be replayed on its own with `run --seed`. The first failure ends the loop.

use crate::config::{ConfigTemplate, GenOptions, RunOptions};
use crate::error::Result;
use crate::generator::MatrixGenerator;
use crate::harness::{prepare_case, random_options, run_case};

#[derive(Debug, Clone, Default)]
pub struct SoakSummary {
    pub iterations: usize,
    pub solver_runs: usize,
    pub master_seed: Option<u64>,
}

pub fn soak(base: &GenOptions, run: &RunOptions, template: &ConfigTemplate, iterations: usize) -> Result<SoakSummary> {
    let mut master = MatrixGenerator::new(base.seed);
    let mut summary = SoakSummary { master_seed: master.seed(), ..SoakSummary::default() };
    let _span = tracing::info_span!("soak", iterations, master_seed = ?summary.master_seed).entered();

    for it in 0..iterations {
        let opts = random_options(master.rng_mut(), base, it);
        let outcome = prepare_case(&opts, template).and_then(|case| run_case(&case, run));
        match outcome {
            Ok(o) => {
                summary.iterations += 1;
                summary.solver_runs += o.runs.len();
                tracing::debug!(iteration = it, source = %opts.source, level = opts.level, "iteration passed");
            }
            Err(e) => {
                tracing::error!(
                    iteration = it,
                    source = %opts.source,
                    level = opts.level,
                    density = opts.density_percent,
                    policy = %opts.policy,
                    seed = ?opts.seed,
                    error = %e,
                    "soak iteration failed"
                );
                return Err(e);
            }
        }
    }
    tracing::info!(iterations = summary.iterations, runs = summary.solver_runs, "soak finished");
    Ok(summary)
}
