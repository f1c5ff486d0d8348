//! Driving the external solver executable.
//!
//! The solver is run as `<solver> <config.xml>` from the case directory. A
//! thread count, when given, is exported through an environment variable
//! (`OMP_NUM_THREADS` unless configured otherwise). Exit status 0 is
//! success; anything else becomes [`HarnessError::ExternalProcessFailure`]
//! carrying the solver's stderr, or its stdout when stderr is empty.

use crate::config::options::DEFAULT_THREAD_ENV;
use crate::error::{HarnessError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

/// Captured output of a successful solver run.
#[derive(Debug, Clone)]
pub struct SolverOutput {
    pub threads: Option<usize>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// How to invoke the solver.
#[derive(Debug, Clone)]
pub struct SolverCommand {
    program: PathBuf,
    thread_env: String,
    extra_args: Vec<String>,
}

impl SolverCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            thread_env: DEFAULT_THREAD_ENV.to_string(),
            extra_args: Vec::new(),
        }
    }

    /// Use `name` instead of `OMP_NUM_THREADS`.
    pub fn with_thread_env(mut self, name: impl Into<String>) -> Self {
        self.thread_env = name.into();
        self
    }

    /// Arguments placed before the config path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    fn describe(&self, config: &Path) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.extra_args.iter().cloned());
        parts.push(config.display().to_string());
        parts.join(" ")
    }

    /// Run once on `config` from `work_dir`.
    pub fn run(&self, config: &Path, work_dir: &Path, threads: Option<usize>) -> Result<SolverOutput> {
        let command = self.describe(config);
        let _span = tracing::info_span!("solver", %command, ?threads).entered();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.extra_args).arg(config).current_dir(work_dir);
        if let Some(t) = threads {
            cmd.env(&self.thread_env, t.to_string());
        }

        let start = Instant::now();
        let output = cmd.output()?;
        let elapsed = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            tracing::debug!(code = ?output.status.code(), "solver failed");
            return Err(HarnessError::ExternalProcessFailure {
                command,
                code: output.status.code(),
                output: if stderr.is_empty() { stdout } else { stderr },
            });
        }
        tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "solver finished");
        Ok(SolverOutput { threads, stdout, stderr, elapsed })
    }

    /// Run once per thread count, handing each output to `after_each` before
    /// the next run starts. An empty sweep runs once without setting the
    /// thread variable. Stops at the first failure of either.
    pub fn sweep<F>(&self, config: &Path, work_dir: &Path, threads: &[usize], mut after_each: F) -> Result<Vec<SolverOutput>>
    where
        F: FnMut(&SolverOutput) -> Result<()>,
    {
        let counts: Vec<Option<usize>> = if threads.is_empty() {
            vec![None]
        } else {
            threads.iter().copied().map(Some).collect()
        };
        let mut outputs = Vec::with_capacity(counts.len());
        for t in counts {
            let out = self.run(config, work_dir, t)?;
            after_each(&out)?;
            outputs.push(out);
        }
        Ok(outputs)
    }
}
