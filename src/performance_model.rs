use anyhow::{Context, Result};
use log::debug;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

use crate::linalg;


/// Non-negative least squares performance model over selected feature rows.
///
/// Fitted on `[time, 1.0, term...]` rows as produced by
/// [`crate::feature_selection::KeyFeatureSelector::transform`]; predicts
/// elapsed time for new configurations. Coefficients are constrained
/// non-negative because every term models a cost contribution.
#[derive(Debug, Clone)]
pub struct PerformanceModel {
    coefficients: Array1<f64>,
}

impl PerformanceModel {
    /// Fit the model; the first column of `selected_points` is the elapsed
    /// time label, the remaining columns are the feature terms.
    pub fn fit(selected_points: &ArrayView2<f64>) -> Result<Self> {
        let labels = selected_points.column(0).to_owned();
        let features = selected_points.slice(s![.., 1..]);
        let coefficients = nnls(&features, &labels.view())?;
        debug!("fitted performance model coefficients {coefficients}");
        Ok(Self { coefficients })
    }

    pub fn coefficients(&self) -> ArrayView1<f64> {
        self.coefficients.view()
    }

    /// Predicted elapsed time for one feature row (label column excluded).
    pub fn predict(&self, features: &ArrayView1<f64>) -> f64 {
        features.dot(&self.coefficients)
    }

    /// Mean relative deviation of the predictions from the training labels,
    /// as a fraction (0.02 means the model over-predicts by 2% on average).
    pub fn mean_relative_error(&self, selected_points: &ArrayView2<f64>) -> f64 {
        let ratios = selected_points
            .rows()
            .into_iter()
            .map(|row| self.predict(&row.slice(s![1..])) / row[0])
            .collect::<Vec<_>>();
        ratios.iter().sum::<f64>() / ratios.len() as f64 - 1.0
    }
}

/// Lawson-Hanson active-set non-negative least squares:
/// `argmin_x ||A x - y||` subject to `x >= 0`.
///
/// Deterministic; moves the largest-gradient coordinate into the
/// passive set, solves the unconstrained subproblem there and backtracks
/// along the segment to the previous iterate whenever the subproblem
/// solution leaves the feasible orthant.
fn nnls(a: &ArrayView2<f64>, y: &ArrayView1<f64>) -> Result<Array1<f64>> {
    let num_terms = a.ncols();
    let mut x = Array1::<f64>::zeros(num_terms);
    let mut passive = vec![false; num_terms];

    let tolerance = 1e-10 * a.iter().map(|v| v.abs()).fold(f64::MIN, f64::max).max(1.0);
    let max_rounds = 3 * num_terms.max(1);

    for _ in 0..max_rounds {
        let gradient = a.t().dot(&(y - &a.dot(&x)));
        let candidate = gradient
            .iter()
            .enumerate()
            .filter(|(term, &g)| !passive[*term] && g > tolerance)
            .max_by(|&(_, left), &(_, right)| left.total_cmp(right))
            .map(|(term, _)| term);
        let Some(entering) = candidate else { break };
        passive[entering] = true;

        loop {
            let trial = solve_passive(a, y, &passive)?;
            let negative = passive
                .iter()
                .enumerate()
                .filter(|&(term, &in_passive)| in_passive && trial[term] <= 0.0)
                .map(|(term, _)| term)
                .collect::<Vec<_>>();
            if negative.is_empty() {
                x = trial;
                break;
            }
            // Largest feasible step from x towards the trial solution.
            let alpha = negative
                .iter()
                .map(|&term| x[term] / (x[term] - trial[term]))
                .fold(f64::INFINITY, f64::min);
            x.zip_mut_with(&trial, |current, &target| {
                *current += alpha * (target - *current)
            });
            for (term, in_passive) in passive.iter_mut().enumerate() {
                if *in_passive && x[term].abs() <= 1e-12 {
                    x[term] = 0.0;
                    *in_passive = false;
                }
            }
        }
    }
    Ok(x)
}

/// Unconstrained least squares restricted to the passive columns; inactive
/// terms stay exactly zero.
fn solve_passive(
    a: &ArrayView2<f64>,
    y: &ArrayView1<f64>,
    passive: &[bool],
) -> Result<Array1<f64>> {
    let columns = passive
        .iter()
        .enumerate()
        .filter(|(_, &in_passive)| in_passive)
        .map(|(term, _)| term)
        .collect::<Vec<_>>();
    let mut reduced = Array2::<f64>::zeros((a.nrows(), columns.len()));
    for (out_index, &term) in columns.iter().enumerate() {
        reduced.column_mut(out_index).assign(&a.column(term));
    }
    let solution = linalg::least_squares(&reduced.view(), y)
        .context("passive-set regression matrix is singular")?;
    let mut full = Array1::<f64>::zeros(a.ncols());
    for (out_index, &term) in columns.iter().enumerate() {
        full[term] = solution[out_index];
    }
    Ok(full)
}
