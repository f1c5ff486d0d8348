use clap::{Args, Parser, Subcommand};
use spiluk_harness::config::options::{DEFAULT_THREAD_ENV, default_max_threads, thread_sweep};
use spiluk_harness::config::{ConfigTemplate, GenOptions, RunOptions};
use spiluk_harness::generator::{MatrixSource, SparsityPolicy};
use spiluk_harness::harness::{prepare_case, run_case, soak};
use spiluk_harness::verify::Checks;
use std::path::PathBuf;

/// Matrix generation and verification harness for an external ILU(k) solver
#[derive(Parser)]
#[command(name = "spiluk-harness", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a matrix, its right-hand side and the solver config
    Gen(CaseArgs),
    /// Generate a case, run the solver on it and verify the factors
    Run {
        #[command(flatten)]
        case: CaseArgs,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Run many random cases, stopping at the first failure
    Soak {
        #[command(flatten)]
        case: CaseArgs,
        #[command(flatten)]
        solver: SolverArgs,
        /// Number of iterations
        #[arg(long, default_value_t = 100)]
        iterations: usize,
    },
}

#[derive(Args)]
struct CaseArgs {
    /// Matrix source: `catalog:<i>`, `<dim>` or `<dim>:<block size>`
    #[arg(short, long, default_value = "12")]
    matrix: MatrixSource,

    /// Percentage of off-diagonal cells (or blocks) made nonzero
    #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(0..=100))]
    density: u32,

    /// Sparsity policy: uniform or block
    #[arg(short, long, default_value = "uniform")]
    policy: SparsityPolicy,

    /// ILU level of fill
    #[arg(short, long, default_value_t = 0)]
    level: usize,

    /// Base name of the case files
    #[arg(short, long, default_value = "spiluk")]
    root: String,

    /// Directory for the case files
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// XML template replacing the built-in one
    #[arg(long)]
    template: Option<PathBuf>,
}

#[derive(Args)]
struct SolverArgs {
    /// Solver executable
    #[arg(long, env = "SPILUK_SOLVER")]
    solver: PathBuf,

    /// Argument passed to the solver before the config path (repeatable)
    #[arg(long = "solver-arg", allow_hyphen_values = true)]
    solver_args: Vec<String>,

    /// Environment variable carrying the thread count
    #[arg(long, default_value = DEFAULT_THREAD_ENV)]
    thread_env: String,

    /// Explicit thread counts to run (comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "sweep")]
    threads: Vec<usize>,

    /// Sweep thread counts 1..=N (N defaults to the number of CPUs)
    #[arg(long, num_args = 0..=1, default_missing_value = "0")]
    sweep: Option<usize>,

    /// Comparison tolerance
    #[arg(long, default_value_t = 1e-8)]
    tol: f64,

    /// Only check L * U against A on A's pattern
    #[arg(long)]
    product_only: bool,

    /// Remove the matrix and config after the run
    #[arg(long)]
    clean: bool,
}

impl CaseArgs {
    fn options(&self) -> GenOptions {
        GenOptions {
            source: self.matrix,
            density_percent: self.density,
            policy: self.policy,
            level: self.level,
            root: self.root.clone(),
            out_dir: self.out_dir.clone(),
            seed: self.seed,
        }
    }

    fn template(&self) -> ConfigTemplate {
        match &self.template {
            Some(path) => ConfigTemplate::from_file(path).unwrap_or_else(|e| {
                eprintln!("Template error: {}", e);
                std::process::exit(1);
            }),
            None => ConfigTemplate::default(),
        }
    }
}

impl SolverArgs {
    fn options(&self) -> RunOptions {
        let threads = match self.sweep {
            Some(0) => thread_sweep(default_max_threads()),
            Some(n) => thread_sweep(n),
            None => self.threads.clone(),
        };
        RunOptions {
            solver: self.solver.clone(),
            solver_args: self.solver_args.clone(),
            thread_env: self.thread_env.clone(),
            threads,
            tolerance: self.tol,
            checks: if self.product_only { Checks::PRODUCT } else { Checks::all() },
            keep_files: !self.clean,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Gen(case) => {
            let prepared = prepare_case(&case.options(), &case.template()).unwrap_or_else(|e| {
                eprintln!("Generation error: {}", e);
                std::process::exit(1);
            });
            println!(
                "wrote {} ({}x{}, nnz {}, seed {:?})",
                prepared.files.matrix().display(),
                prepared.matrix.nrows(),
                prepared.matrix.ncols(),
                prepared.matrix.nnz(),
                prepared.seed
            );
        }
        Command::Run { case, solver } => {
            let run = solver.options();
            let prepared = prepare_case(&case.options(), &case.template()).unwrap_or_else(|e| {
                eprintln!("Generation error: {}", e);
                std::process::exit(1);
            });
            let outcome = run_case(&prepared, &run).unwrap_or_else(|e| {
                eprintln!("Case {} (seed {:?}) failed: {}", prepared.files.root, prepared.seed, e);
                std::process::exit(1);
            });
            for (out, report) in &outcome.runs {
                println!(
                    "threads {:?}: {} ok in {:.3}s",
                    out.threads,
                    report.reference,
                    out.elapsed.as_secs_f64()
                );
            }
        }
        Command::Soak { case, solver, iterations } => {
            let run = solver.options();
            let summary = soak(&case.options(), &run, &case.template(), iterations).unwrap_or_else(|e| {
                eprintln!("Soak error: {}", e);
                std::process::exit(1);
            });
            println!(
                "soak passed: {} cases, {} solver runs (master seed {:?})",
                summary.iterations, summary.solver_runs, summary.master_seed
            );
        }
    }
}
