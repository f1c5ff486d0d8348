use thiserror::Error;

// Unified error type for the harness

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
    #[error("command `{command}` failed with exit code {code:?}: {output}")]
    ExternalProcessFailure {
        command: String,
        code: Option<i32>,
        output: String,
    },
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("factorization error: {0}")]
    Factor(String),
    #[error("verification failed: {0}")]
    Verification(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Fail with `PreconditionViolation` unless `condition` holds.
pub(crate) fn expect(condition: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::PreconditionViolation(msg()))
    }
}
