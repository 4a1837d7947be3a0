use anyhow::{anyhow, Context, Result};
use itertools::Itertools;
use log::info;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

use crate::linalg;

#[cfg(test)]
mod tests;

/// A predictor survives selection when the magnitude of its fitted
/// coefficient reaches this fraction of the mean coefficient magnitude.
pub const SELECTION_THRESHOLD_FACTOR: f64 = 0.1;

/// Number of engineered regression terms, label included.
pub const NUM_REGRESSION_FEATURES: usize = 6;

/// Regression feature row for one `[cores, machines, fraction, time]`
/// benchmark point: `[time, fraction/cores, 1/cores, machines,
/// ln(machines), machines^2]`. The label rides in front so downstream
/// consumers can slice it off.
pub fn regression_features(point: &ArrayView1<f64>) -> Result<[f64; NUM_REGRESSION_FEATURES]> {
    if point.len() < 4 {
        return Err(anyhow!(
            "benchmark point has {} fields, expected cores, machines, fraction, time",
            point.len()
        ));
    }
    let [cores, machines, fraction, time] = [point[0], point[1], point[2], point[3]];
    if cores < 1.0 || machines < 1.0 {
        return Err(anyhow!(
            "benchmark point needs at least one core and one machine, \
             got cores {cores}, machines {machines}"
        ));
    }
    Ok([
        time,
        fraction / cores,
        1.0 / cores,
        machines,
        machines.ln(),
        machines * machines,
    ])
}

fn regression_matrix(points: &ArrayView2<f64>) -> Result<Array2<f64>> {
    let mut flat = Vec::with_capacity(points.nrows() * NUM_REGRESSION_FEATURES);
    for row in points.rows() {
        flat.extend_from_slice(&regression_features(&row)?);
    }
    Ok(
        Array2::from_shape_vec((points.nrows(), NUM_REGRESSION_FEATURES), flat)
            .expect("row count times term count matches the flat buffer"),
    )
}

/// Linear-regression based key-feature selector.
///
/// Fits elapsed time against the engineered predictors and keeps the ones
/// whose coefficient magnitude is at least
/// [`SELECTION_THRESHOLD_FACTOR`] times the mean magnitude. Immutable once
/// fitted; the training data is always passed in explicitly.
#[derive(Debug, Clone)]
pub struct KeyFeatureSelector {
    coefficients: Array1<f64>,
    selected: Vec<usize>,
}

impl KeyFeatureSelector {
    /// Fit the selector on `[cores, machines, fraction, time]` benchmark
    /// rows.
    pub fn fit(points: &ArrayView2<f64>) -> Result<Self> {
        let features = regression_matrix(points)?;
        let labels = features.column(0).to_owned();
        let predictors = features.slice(s![.., 1..]);

        // Design matrix with an intercept column; the intercept is not a
        // selectable predictor.
        let mut design = Array2::<f64>::ones((predictors.nrows(), NUM_REGRESSION_FEATURES));
        design.slice_mut(s![.., 1..]).assign(&predictors);
        let beta = linalg::least_squares(&design.view(), &labels.view())
            .context("regression matrix is singular; not enough distinct benchmark points")?;
        let coefficients = beta.slice(s![1..]).to_owned();

        let magnitudes = coefficients.mapv(f64::abs);
        let threshold = SELECTION_THRESHOLD_FACTOR * magnitudes.mean().unwrap_or(0.0);
        let selected = magnitudes
            .iter()
            .positions(|&m| m >= threshold)
            .collect_vec();
        info!(
            "kept {} of {} regression terms: {:?}",
            selected.len(),
            coefficients.len(),
            selected
        );
        Ok(Self {
            coefficients,
            selected,
        })
    }

    /// Fitted coefficients of all predictors, selection aside.
    pub fn coefficients(&self) -> ArrayView1<f64> {
        self.coefficients.view()
    }

    /// Indices of the predictors that survived selection, ascending.
    pub fn selected_terms(&self) -> &[usize] {
        &self.selected
    }

    /// Project benchmark points onto the selected predictors, producing one
    /// `[time, 1.0, selected terms...]` row per point. The constant column
    /// carries the serial fraction of the computation for the downstream
    /// performance model.
    pub fn transform(&self, points: &ArrayView2<f64>) -> Result<Array2<f64>> {
        let features = regression_matrix(points)?;
        let width = 2 + self.selected.len();
        let mut rows = Array2::<f64>::zeros((features.nrows(), width));
        for (row_index, row) in features.rows().into_iter().enumerate() {
            rows[(row_index, 0)] = row[0];
            rows[(row_index, 1)] = 1.0;
            for (out_index, &term) in self.selected.iter().enumerate() {
                rows[(row_index, 2 + out_index)] = row[1 + term];
            }
        }
        Ok(rows)
    }
}
