use ndarray::{arr1, arr2};

use super::{solve, DesignProblem, LinearConstraint, SolverOptions};
use crate::datastructures::DesignError;

fn two_sample_problem(costs: [f64; 2], budget: f64) -> DesignProblem {
    DesignProblem {
        information_matrices: vec![
            arr2(&[[1.0, 0.0], [0.0, 0.1]]),
            arr2(&[[0.1, 0.0], [0.0, 1.0]]),
        ],
        cost: LinearConstraint {
            coefficients: arr1(&costs),
            upper_bound: budget,
        },
    }
}

#[test]
fn test_symmetric_samples_split_the_budget() {
    let problem = two_sample_problem([1.0, 1.0], 1.0);
    let weights = solve(&problem, &SolverOptions::default()).unwrap();
    assert!((weights[0] - 0.5).abs() < 1e-6);
    assert!((weights[1] - 0.5).abs() < 1e-6);
}

#[test]
fn test_loose_budget_saturates_the_box() {
    let problem = two_sample_problem([1.0, 1.0], 4.0);
    let weights = solve(&problem, &SolverOptions::default()).unwrap();
    assert!((weights[0] - 1.0).abs() < 1e-6);
    assert!((weights[1] - 1.0).abs() < 1e-6);
}

#[test]
fn test_cheaper_sample_gets_more_weight() {
    let problem = two_sample_problem([1.0, 2.0], 1.0);
    let options = SolverOptions {
        tolerance: 1e-6,
        ..SolverOptions::default()
    };
    let weights = solve(&problem, &options).unwrap();
    assert!(weights[0] > weights[1]);
    assert!((weights[0] - 0.5987).abs() < 1e-2);
    assert!((weights[1] - 0.2007).abs() < 1e-2);
    let cost = weights.dot(&problem.cost.coefficients);
    assert!(cost <= 1.0 + 1e-9);
}

#[test]
fn test_weights_stay_feasible() {
    let problem = two_sample_problem([1.0, 3.0], 2.5);
    let weights = solve(&problem, &SolverOptions::default()).unwrap();
    assert!(weights.iter().all(|&w| (0.0..=1.0).contains(&w)));
    assert!(weights.dot(&problem.cost.coefficients) <= 2.5 + 1e-9);
}

#[test]
fn test_deterministic_resolve() {
    let problem = two_sample_problem([1.0, 2.0], 1.0);
    let first = solve(&problem, &SolverOptions::default()).unwrap();
    let second = solve(&problem, &SolverOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_zero_budget_is_infeasible() {
    let problem = two_sample_problem([1.0, 1.0], 0.0);
    assert!(matches!(
        solve(&problem, &SolverOptions::default()),
        Err(DesignError::Infeasible { .. })
    ));
}

#[test]
fn test_singular_information_matrices_fail() {
    let problem = DesignProblem {
        information_matrices: vec![arr2(&[[1.0, 0.0], [0.0, 0.0]])],
        cost: LinearConstraint {
            coefficients: arr1(&[1.0]),
            upper_bound: 1.0,
        },
    };
    assert!(matches!(
        solve(&problem, &SolverOptions::default()),
        Err(DesignError::SolverFailed { .. })
    ));
}

#[test]
fn test_non_positive_cost_is_rejected() {
    let problem = two_sample_problem([1.0, 0.0], 1.0);
    assert!(matches!(
        solve(&problem, &SolverOptions::default()),
        Err(DesignError::Input { .. })
    ));
}
