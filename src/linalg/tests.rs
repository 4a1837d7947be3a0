use ndarray::{arr1, arr2};

use super::{cholesky, cholesky_inverse, cholesky_solve, least_squares, log_det};

#[test]
fn test_cholesky_factor() {
    let a = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
    let l = cholesky(&a.view()).unwrap();
    assert_eq!(l[(0, 0)], 2.0);
    assert_eq!(l[(1, 0)], 1.0);
    assert!((l[(1, 1)] - 2.0_f64.sqrt()).abs() < 1e-12);
    assert_eq!(l[(0, 1)], 0.0);
}

#[test]
fn test_cholesky_rejects_indefinite() {
    let a = arr2(&[[1.0, 2.0], [2.0, 1.0]]);
    assert!(cholesky(&a.view()).is_none());
}

#[test]
fn test_log_det() {
    let a = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
    let l = cholesky(&a.view()).unwrap();
    assert!((log_det(&l.view()) - 8.0_f64.ln()).abs() < 1e-12);
}

#[test]
fn test_cholesky_solve() {
    let a = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
    let l = cholesky(&a.view()).unwrap();
    let x = cholesky_solve(&l.view(), &arr1(&[8.0, 7.0]).view());
    assert!((x[0] - 1.25).abs() < 1e-12);
    assert!((x[1] - 1.5).abs() < 1e-12);
}

#[test]
fn test_cholesky_inverse() {
    let a = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
    let l = cholesky(&a.view()).unwrap();
    let inv = cholesky_inverse(&l.view());
    let product = a.dot(&inv);
    for i in 0..2 {
        for j in 0..2 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((product[(i, j)] - expected).abs() < 1e-12);
        }
    }
}

#[test]
fn test_least_squares_simple_system() {
    // Fit y = 2 + 3x on x = [0, 1, 2].
    let x = arr2(&[[1.0, 0.0], [1.0, 1.0], [1.0, 2.0]]);
    let y = arr1(&[2.0, 5.0, 8.0]);
    let beta = least_squares(&x.view(), &y.view()).unwrap();
    assert!((beta[0] - 2.0).abs() < 1e-10);
    assert!((beta[1] - 3.0).abs() < 1e-10);
}

#[test]
fn test_least_squares_rejects_collinear_columns() {
    let x = arr2(&[[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]]);
    let y = arr1(&[1.0, 2.0, 3.0]);
    assert!(least_squares(&x.view(), &y.view()).is_none());
}
