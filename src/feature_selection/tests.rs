use std::path::Path;

use ndarray::arr1;

use super::{regression_features, KeyFeatureSelector};
use crate::csv_parser::{read_training_csv, training_points};

fn synthetic_points() -> ndarray::Array2<f64> {
    let df = read_training_csv(Path::new("data/test/synthetic_model.csv")).unwrap();
    training_points(&df).unwrap()
}

#[test]
fn test_regression_features_values() {
    let point = arr1(&[8.0, 4.0, 0.5, 31.25]);
    let features = regression_features(&point.view()).unwrap();
    assert_eq!(features[0], 31.25);
    assert_eq!(features[1], 0.5 / 8.0);
    assert_eq!(features[2], 1.0 / 8.0);
    assert_eq!(features[3], 4.0);
    assert!((features[4] - 4.0_f64.ln()).abs() < 1e-15);
    assert_eq!(features[5], 16.0);
}

#[test]
fn test_regression_features_reject_zero_cores() {
    let point = arr1(&[0.0, 1.0, 0.5, 10.0]);
    assert!(regression_features(&point.view()).is_err());
}

#[test]
fn test_fit_recovers_the_generating_terms() {
    // The fixture is generated without noise from
    // time = 100 * fraction/cores + 40 / cores + 5 * machines,
    // so only those three terms should survive selection.
    let points = synthetic_points();
    let selector = KeyFeatureSelector::fit(&points.view()).unwrap();
    assert_eq!(selector.selected_terms(), &[0, 1, 2]);
    let coefficients = selector.coefficients();
    assert!((coefficients[0] - 100.0).abs() < 1e-4);
    assert!((coefficients[1] - 40.0).abs() < 1e-4);
    assert!((coefficients[2] - 5.0).abs() < 1e-4);
    assert!(coefficients[3].abs() < 1e-4);
    assert!(coefficients[4].abs() < 1e-4);
}

#[test]
fn test_transform_keeps_label_and_serial_term() {
    let points = synthetic_points();
    let selector = KeyFeatureSelector::fit(&points.view()).unwrap();
    let transformed = selector.transform(&points.view()).unwrap();
    assert_eq!(transformed.nrows(), points.nrows());
    assert_eq!(transformed.ncols(), 2 + selector.selected_terms().len());
    // First fixture row: 2 cores, 1 machine, fraction 0.25, 37.5 seconds.
    assert_eq!(transformed[(0, 0)], 37.5);
    assert_eq!(transformed[(0, 1)], 1.0);
    assert_eq!(transformed[(0, 2)], 0.125);
    assert_eq!(transformed[(0, 3)], 0.5);
    assert_eq!(transformed[(0, 4)], 1.0);
}

#[test]
fn test_fit_requires_distinct_points() {
    let degenerate = ndarray::Array2::from_shape_fn((8, 4), |(_, c)| [4.0, 2.0, 0.5, 30.0][c]);
    assert!(KeyFeatureSelector::fit(&degenerate.view()).is_err());
}
