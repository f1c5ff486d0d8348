//! Verification tests: reference factorizations reproduce the matrix, and the
//! factor comparison accepts correct factors and rejects perturbed ones.
//!
//! The tests use `faer` for the products and `approx` for floating-point
//! comparisons.

use approx::assert_abs_diff_eq;
use spiluk_harness::error::HarnessError;
use spiluk_harness::generator::{Catalog, MatrixGenerator, SparsityPolicy};
use spiluk_harness::matrix::Matrix;
use spiluk_harness::verify::{Checks, Reference, block_lu3, iluk, verify_factors};

/// Compute `L * U` as a harness matrix.
fn product(l: &Matrix<f64>, u: &Matrix<f64>) -> Matrix<f64> {
    Matrix::from_faer(&(&l.to_faer() * &u.to_faer()))
}

fn assert_matrix_close(a: &Matrix<f64>, b: &Matrix<f64>, eps: f64) {
    assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()));
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert_abs_diff_eq!(*x, *y, epsilon = eps);
    }
}

/// With a level at least the dimension nothing is dropped: `L * U == A`.
#[test]
fn full_level_iluk_is_exact_lu() {
    let mut g = MatrixGenerator::new(Some(41));
    for n in [4, 7, 10] {
        let a = g.generate(n, 30, 1, SparsityPolicy::UniformRandom).unwrap();
        let f = iluk(&a, n).unwrap();
        assert_matrix_close(&product(&f.l, &f.u), &a, 1e-9);
        for i in 0..n {
            assert_eq!(f.l[(i, i)], 1.0);
            for j in (i + 1)..n {
                assert_eq!(f.l[(i, j)], 0.0);
                assert_eq!(f.u[(j, i)], 0.0);
            }
        }
    }
}

/// ILU(0) keeps the pattern of A and matches A on it.
#[test]
fn ilu0_matches_a_on_its_pattern() {
    let a = Catalog::Asym6.matrix();
    let f = iluk(&a, 0).unwrap();
    let lu = product(&f.l, &f.u);
    for i in 0..6 {
        for j in 0..6 {
            if a[(i, j)] != 0.0 {
                assert_abs_diff_eq!(lu[(i, j)], a[(i, j)], epsilon = 1e-12);
            } else {
                assert_eq!(f.l[(i, j)] + f.u[(i, j)], 0.0, "fill at ({}, {})", i, j);
            }
        }
    }
}

/// Block LU factors of three-block matrices multiply back to A.
#[test]
fn block_lu_reconstructs_matrix() {
    let mut g = MatrixGenerator::new(Some(42));
    for bs in [1, 2, 4] {
        let a = g.generate(3 * bs, 60, bs, SparsityPolicy::BlockConcentrated).unwrap();
        let (l, u) = block_lu3(&a, bs).unwrap();
        assert_matrix_close(&product(&l, &u), &a, 1e-9);
        // identity diagonal blocks in L, zero below the block diagonal in U
        for i in 0..3 * bs {
            for j in 0..3 * bs {
                if i / bs == j / bs {
                    assert_eq!(l[(i, j)], if i == j { 1.0 } else { 0.0 });
                }
                if i / bs > j / bs {
                    assert_eq!(u[(i, j)], 0.0);
                }
            }
        }
    }
}

/// Reference factors pass every check; a perturbed U fails the upper check.
#[test]
fn verify_accepts_reference_and_rejects_perturbation() {
    let a = Catalog::Sym6.matrix();
    let f = iluk(&a, 1).unwrap();
    let report = verify_factors(&a, &f.l, &f.u, 1, 1, Checks::all(), 1e-10).unwrap();
    assert_eq!(report.reference, Reference::PointIluk { level: 1 });
    assert_eq!(report.deviations.len(), 3);

    let mut bad_u = f.u.clone();
    bad_u[(2, 2)] += 1e-3;
    let err = verify_factors(&a, &f.l, &bad_u, 1, 1, Checks::UPPER, 1e-10).unwrap_err();
    match err {
        HarnessError::Verification(msg) => {
            assert!(msg.starts_with("upper check against ILU(1)"), "{}", msg);
            assert!(msg.contains("(2, 2)"), "{}", msg);
        }
        other => panic!("unexpected {:?}", other),
    }
}

/// A lower factor written without its unit diagonal is still accepted.
#[test]
fn verify_accepts_implicit_unit_diagonal() {
    let a = Catalog::Asym4.matrix();
    let f = iluk(&a, 0).unwrap();
    let mut strict_l = f.l.clone();
    for i in 0..4 {
        strict_l[(i, i)] = 0.0;
    }
    assert!(verify_factors(&a, &strict_l, &f.u, 0, 1, Checks::all(), 1e-12).is_ok());
}

/// Three-block cases at full fill are compared with block LU.
#[test]
fn verify_uses_block_lu_for_three_blocks() {
    let mut g = MatrixGenerator::new(Some(43));
    let a = g.generate(6, 50, 2, SparsityPolicy::BlockConcentrated).unwrap();
    let (l, u) = block_lu3(&a, 2).unwrap();
    let report = verify_factors(&a, &l, &u, 2, 2, Checks::all(), 1e-9).unwrap();
    assert_eq!(report.reference, Reference::BlockLu3 { block_size: 2 });

    // below full fill only the product check applies
    let report = verify_factors(&a, &l, &u, 1, 2, Checks::all(), 1e-9).unwrap();
    assert_eq!(report.reference, Reference::PatternOnly);
    assert_eq!(report.deviations.len(), 1);
}

/// Factors of the wrong shape are a verification failure.
#[test]
fn shape_mismatch_is_reported() {
    let a = Catalog::Asym4.matrix();
    let small = Matrix::zeros(3, 3);
    let err = verify_factors(&a, &small, &small, 0, 1, Checks::LOWER, 1e-9).unwrap_err();
    assert!(matches!(err, HarnessError::Verification(_)));
}
