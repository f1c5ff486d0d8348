//! End-to-end cases: generate, write, solve, verify, clean up.
//!
//! A case writes three files into its directory, named after its root:
//! `<root>.mtx` (the matrix), `<root>_rhs.mtx` (the right-hand side) and
//! `<root>.xml` (the solver configuration). The solver is expected to write
//! `<root>_L.mtx` and `<root>_U.mtx` next to them. After every solver run the
//! factors are read back, verified and removed; the right-hand side is removed
//! once the case is done, the matrix and configuration only when the run
//! options say so.

use crate::config::{ConfigTemplate, GenOptions, RunOptions};
use crate::error::Result;
use crate::generator::{MatrixGenerator, MatrixSource, SparsityPolicy, rhs};
use crate::io::mtx::{read_mtx_file, write_mtx_file, write_vector_file};
use crate::matrix::Matrix;
use crate::runner::{SolverCommand, SolverOutput};
use crate::verify::{VerifyReport, verify_factors};
use rand::Rng;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod soak;
pub use soak::{SoakSummary, soak};

/// Paths of the files belonging to one case.
#[derive(Debug, Clone)]
pub struct CaseFiles {
    pub dir: PathBuf,
    pub root: String,
}

impl CaseFiles {
    pub fn new(dir: impl Into<PathBuf>, root: impl Into<String>) -> Self {
        Self { dir: dir.into(), root: root.into() }
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.root, suffix))
    }

    pub fn matrix(&self) -> PathBuf {
        self.path(".mtx")
    }

    pub fn rhs(&self) -> PathBuf {
        self.path("_rhs.mtx")
    }

    pub fn config(&self) -> PathBuf {
        self.path(".xml")
    }

    pub fn lower(&self) -> PathBuf {
        self.path("_L.mtx")
    }

    pub fn upper(&self) -> PathBuf {
        self.path("_U.mtx")
    }
}

/// Remove `path`, ignoring a file that is already gone.
fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

/// A case written to disk, ready for the solver.
#[derive(Debug, Clone)]
pub struct PreparedCase {
    pub files: CaseFiles,
    pub source: MatrixSource,
    pub matrix: Matrix<f64>,
    pub level: usize,
    /// Seed that reproduces the matrix.
    pub seed: Option<u64>,
}

impl PreparedCase {
    pub fn block_size(&self) -> usize {
        self.source.block_size()
    }
}

/// Generate the matrix for `opts` and write the case files.
pub fn prepare_case(opts: &GenOptions, template: &ConfigTemplate) -> Result<PreparedCase> {
    let mut generator = MatrixGenerator::new(opts.seed);
    prepare_with(&mut generator, opts, template)
}

/// Like [`prepare_case`], drawing from an existing generator.
pub fn prepare_with<R: Rng>(
    generator: &mut MatrixGenerator<R>,
    opts: &GenOptions,
    template: &ConfigTemplate,
) -> Result<PreparedCase> {
    let _span = tracing::info_span!("prepare", source = %opts.source, root = %opts.root).entered();
    let matrix = opts.source.realise(generator, opts.density_percent, opts.policy)?;
    let files = CaseFiles::new(&opts.out_dir, opts.root.clone());
    fs::create_dir_all(&files.dir)?;

    write_mtx_file(&matrix, &files.matrix())?;
    write_vector_file(&rhs(matrix.dim()), &files.rhs())?;
    template.write(&files.config(), opts.level, opts.source.block_size(), &files.root)?;
    tracing::info!(dim = matrix.dim(), nnz = matrix.nnz(), dir = %files.dir.display(), "case written");

    Ok(PreparedCase {
        files,
        source: opts.source,
        matrix,
        level: opts.level,
        seed: generator.seed(),
    })
}

/// Result of running a case through every thread count.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub runs: Vec<(SolverOutput, VerifyReport)>,
}

/// Read back the factors the solver just wrote, remove them, then verify.
/// No factor file outlives this call, whatever the outcome.
fn check_factors(case: &PreparedCase, run: &RunOptions) -> Result<VerifyReport> {
    let files = &case.files;
    let factors = read_mtx_file(&files.lower()).and_then(|l| Ok((l, read_mtx_file(&files.upper())?)));
    remove_if_present(&files.lower())?;
    remove_if_present(&files.upper())?;
    let (l, u) = factors?;
    verify_factors(&case.matrix, &l, &u, case.level, case.block_size(), run.checks, run.tolerance)
}

/// Remove the case inputs after the sweep.
fn clean_case(case: &PreparedCase, run: &RunOptions) -> Result<()> {
    remove_if_present(&case.files.rhs())?;
    if !run.keep_files {
        remove_if_present(&case.files.matrix())?;
        remove_if_present(&case.files.config())?;
    }
    Ok(())
}

/// Anchor a relative solver path such as `./spiluk` at the current directory,
/// since the solver runs from the case directory. Bare names are left for a
/// `PATH` lookup.
fn solver_program(solver: &Path) -> Result<PathBuf> {
    if solver.is_relative() && solver.components().count() > 1 {
        Ok(std::env::current_dir()?.join(solver))
    } else {
        Ok(solver.to_path_buf())
    }
}

/// Run the solver on a prepared case for every configured thread count.
pub fn run_case(case: &PreparedCase, run: &RunOptions) -> Result<CaseOutcome> {
    let _span = tracing::info_span!("case", root = %case.files.root, seed = ?case.seed).entered();
    let solver = SolverCommand::new(solver_program(&run.solver)?)
        .with_args(run.solver_args.iter().cloned())
        .with_thread_env(run.thread_env.clone());
    let config_name = PathBuf::from(format!("{}.xml", case.files.root));

    let mut reports = Vec::new();
    let result = solver.sweep(&config_name, &case.files.dir, &run.threads, |_| {
        reports.push(check_factors(case, run)?);
        Ok(())
    });

    // a solver or verification failure outranks a failed cleanup
    let cleaned = clean_case(case, run);
    let outputs = match result {
        Ok(outputs) => outputs,
        Err(e) => {
            if let Err(c) = cleaned {
                tracing::warn!(error = %c, "case cleanup failed");
            }
            return Err(e);
        }
    };
    cleaned?;
    Ok(CaseOutcome { runs: outputs.into_iter().zip(reports).collect() })
}

/// Options for a quick random case, used by the soak loop.
pub fn random_options<R: Rng>(rng: &mut R, base: &GenOptions, iteration: usize) -> GenOptions {
    let block_size = rng.gen_range(1..=3);
    let grid_dim = rng.gen_range(2..=6);
    let policy = if block_size > 1 && rng.gen_bool(0.5) {
        SparsityPolicy::BlockConcentrated
    } else {
        SparsityPolicy::UniformRandom
    };
    GenOptions {
        source: MatrixSource::Random { dimension: grid_dim * block_size, block_size },
        density_percent: rng.gen_range(10..=50),
        policy,
        level: rng.gen_range(0..=3),
        root: format!("{}_{}", base.root, iteration),
        out_dir: base.out_dir.clone(),
        seed: Some(rng.r#gen()),
    }
}
