//! End-to-end harness tests against stand-in solvers.
//!
//! The stand-in is a small shell script that copies precomputed factors into
//! the files the harness expects (`<root>_L.mtx`, `<root>_U.mtx`), or fails
//! in a controlled way. Scripts are run as `sh <script> <config>` rather than
//! executed directly, which avoids "text file busy" races with other test
//! threads forking while the script is still open. Unix only.
#![cfg(unix)]

use spiluk_harness::config::{ConfigTemplate, GenOptions, RunOptions};
use spiluk_harness::error::HarnessError;
use spiluk_harness::generator::{Catalog, MatrixSource};
use spiluk_harness::harness::{prepare_case, run_case, soak};
use spiluk_harness::io::mtx::write_mtx_file;
use spiluk_harness::verify::iluk;
use std::fs;
use std::path::{Path, PathBuf};

/// Fresh scratch directory unique to this process and test.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("spiluk_harness_{}_{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Run options invoking `body` as a shell script.
fn script(dir: &Path, body: &str) -> RunOptions {
    let path = dir.join("solver.sh");
    fs::write(&path, format!("{}\n", body)).unwrap();
    RunOptions {
        solver: PathBuf::from("sh"),
        solver_args: vec![path.display().to_string()],
        ..RunOptions::default()
    }
}

/// Solver that copies `ref_L.mtx`/`ref_U.mtx` to the case's output names and
/// records the thread count it saw.
const COPYING_SOLVER: &str = r#"root=$(basename "$1" .xml)
test -f "$root.mtx" || { echo "missing $root.mtx" >&2; exit 2; }
test -f "${root}_rhs.mtx" || { echo "missing rhs" >&2; exit 2; }
grep -q "level-of-fill" "$1" || { echo "bad config" >&2; exit 2; }
cp ref_L.mtx "${root}_L.mtx"
cp ref_U.mtx "${root}_U.mtx"
echo "$OMP_NUM_THREADS" >> threads.log"#;

fn catalog_case(dir: &Path, level: usize) -> GenOptions {
    GenOptions {
        source: MatrixSource::Catalog(Catalog::Sym6),
        level,
        root: "case".to_string(),
        out_dir: dir.to_path_buf(),
        seed: Some(7),
        ..GenOptions::default()
    }
}

/// A correct solver passes for every thread count and the case is tidied up.
#[test]
fn correct_factors_pass_thread_sweep() {
    let dir = scratch("pass");
    let a = Catalog::Sym6.matrix();
    let f = iluk(&a, 1).unwrap();
    write_mtx_file(&f.l, &dir.join("ref_L.mtx")).unwrap();
    write_mtx_file(&f.u, &dir.join("ref_U.mtx")).unwrap();

    let case = prepare_case(&catalog_case(&dir, 1), &ConfigTemplate::default()).unwrap();
    assert!(case.files.matrix().exists() && case.files.rhs().exists() && case.files.config().exists());

    let run = RunOptions { threads: vec![1, 2, 3], keep_files: false, ..script(&dir, COPYING_SOLVER) };
    let outcome = run_case(&case, &run).unwrap();
    assert_eq!(outcome.runs.len(), 3);

    let log = fs::read_to_string(dir.join("threads.log")).unwrap();
    assert_eq!(log.lines().collect::<Vec<_>>(), vec!["1", "2", "3"]);
    assert!(!case.files.rhs().exists());
    assert!(!case.files.matrix().exists());
    assert!(!case.files.lower().exists());
    fs::remove_dir_all(&dir).unwrap();
}

/// Factors from the wrong level are caught.
#[test]
fn wrong_level_factors_fail_verification() {
    let dir = scratch("wrong_level");
    let a = Catalog::Asym6.matrix();
    let f = iluk(&a, 0).unwrap();
    write_mtx_file(&f.l, &dir.join("ref_L.mtx")).unwrap();
    write_mtx_file(&f.u, &dir.join("ref_U.mtx")).unwrap();

    let mut opts = catalog_case(&dir, 3);
    opts.source = MatrixSource::Catalog(Catalog::Asym6);
    let case = prepare_case(&opts, &ConfigTemplate::default()).unwrap();
    let run = script(&dir, COPYING_SOLVER);
    let err = run_case(&case, &run).unwrap_err();
    assert!(matches!(err, HarnessError::Verification(_)), "{:?}", err);
    // inputs are kept for inspection; the right-hand side and factors are not
    assert!(case.files.matrix().exists());
    assert!(!case.files.rhs().exists());
    assert!(!case.files.lower().exists());
    assert!(!case.files.upper().exists());
    fs::remove_dir_all(&dir).unwrap();
}

/// Unreadable factors are a parse error and are still removed.
#[test]
fn malformed_factors_are_removed() {
    let dir = scratch("malformed");
    let case = prepare_case(&catalog_case(&dir, 0), &ConfigTemplate::default()).unwrap();
    let run = script(&dir, r#"root=$(basename "$1" .xml); echo garbage > "${root}_L.mtx"; echo garbage > "${root}_U.mtx""#);
    let err = run_case(&case, &run).unwrap_err();
    assert!(matches!(err, HarnessError::Parse { line: 1, .. }), "{:?}", err);
    assert!(!case.files.lower().exists());
    assert!(!case.files.upper().exists());
    fs::remove_dir_all(&dir).unwrap();
}

/// A 1x1 matrix is still written as a coordinate matrix, its right-hand side
/// as an array.
#[test]
fn single_cell_case_files() {
    let dir = scratch("single");
    let opts = GenOptions {
        source: "1".parse().unwrap(),
        root: "one".to_string(),
        out_dir: dir.clone(),
        seed: Some(3),
        ..GenOptions::default()
    };
    let case = prepare_case(&opts, &ConfigTemplate::default()).unwrap();
    let matrix = fs::read_to_string(case.files.matrix()).unwrap();
    let rhs = fs::read_to_string(case.files.rhs()).unwrap();
    assert!(matrix.starts_with("%%MatrixMarket matrix coordinate"), "{}", matrix);
    assert_eq!(rhs, "%%MatrixMarket matrix array real general\n1 1\n1\n");
    fs::remove_dir_all(&dir).unwrap();
}

/// A failing solver surfaces its stderr.
#[test]
fn solver_failure_is_external_process_failure() {
    let dir = scratch("fail");
    let case = prepare_case(&catalog_case(&dir, 0), &ConfigTemplate::default()).unwrap();
    let run = script(&dir, "echo 'factorization diverged' >&2; exit 4");
    match run_case(&case, &run).unwrap_err() {
        HarnessError::ExternalProcessFailure { code, output, .. } => {
            assert_eq!(code, Some(4));
            assert_eq!(output, "factorization diverged");
        }
        other => panic!("unexpected {:?}", other),
    }
    fs::remove_dir_all(&dir).unwrap();
}

/// A solver that exits 0 without writing factors is an IO failure.
#[test]
fn missing_factor_files_fail() {
    let dir = scratch("missing");
    let case = prepare_case(&catalog_case(&dir, 0), &ConfigTemplate::default()).unwrap();
    let run = script(&dir, "exit 0");
    assert!(matches!(run_case(&case, &run), Err(HarnessError::Io(_))));
    fs::remove_dir_all(&dir).unwrap();
}

/// Soak stops at the first failing iteration.
#[test]
fn soak_aborts_on_first_failure() {
    let dir = scratch("soak");
    let base = GenOptions { out_dir: dir.clone(), seed: Some(99), ..GenOptions::default() };
    let run = script(&dir, "echo nope >&2; exit 1");
    let err = soak(&base, &run, &ConfigTemplate::default(), 5).unwrap_err();
    assert!(matches!(err, HarnessError::ExternalProcessFailure { .. }));
    assert!(dir.join("spiluk_0.mtx").exists());
    assert!(!dir.join("spiluk_1.mtx").exists());
    fs::remove_dir_all(&dir).unwrap();
}
