use itertools::Itertools;
use log::info;
use ndarray::{Array1, Array2};

use crate::datastructures::{
    CandidateSample, DesignError, DesignParameters, ExperimentSelection, SelectedExperiment,
};
use crate::linalg;
use crate::solver::{self, DesignProblem, LinearConstraint, SolverOptions};


/// Solved weights below this threshold are not worth benchmarking.
pub const MIN_WEIGHT_FOR_SELECTION: f64 = 0.1;

/// Length of the per-sample feature vector.
pub const NUM_FEATURES: usize = 6;

/// Enumerate the feasible candidate grid: `num_parts_interpolate` evenly
/// spaced input fractions between `parts_min/total_parts` and
/// `parts_max/total_parts` inclusive, crossed with every machine count in
/// `[mcs_min, mcs_max]`, keeping pairs with at least as many partitions as
/// cores.
///
/// Lazy, deterministic and restartable; an unsatisfiable parameter range
/// yields an empty sequence rather than an error.
pub fn enumerate_samples(
    params: &DesignParameters,
) -> impl Iterator<Item = CandidateSample> + '_ {
    interpolate(
        params.scale_min(),
        params.scale_max(),
        params.num_parts_interpolate,
    )
    .cartesian_product(params.mcs_min..=params.mcs_max)
    .filter_map(|(scale, machine_count)| {
        let partitions = (scale * params.total_parts as f64).round();
        (partitions >= (params.cores_per_mc * machine_count) as f64).then(|| CandidateSample {
            scale,
            machine_count,
        })
    })
}

/// `count` evenly spaced values from `start` to `end` inclusive. The last
/// value is `end` exactly, not a rounded multiple of the step.
fn interpolate(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> + Clone {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| {
        if count > 1 && i == count - 1 {
            end
        } else {
            start + step * i as f64
        }
    })
}

/// Feature vector of one candidate sample:
/// `[1, scale/cores, sqrt(scale)/cores, machines, ln(machines), machines^2]`.
///
/// Pure and deterministic; the intercept component is always exactly 1.
pub fn feature_map(
    sample: &CandidateSample,
    cores_per_mc: u32,
) -> Result<[f64; NUM_FEATURES], DesignError> {
    if sample.machine_count == 0 {
        return Err(DesignError::Domain {
            stage: "feature map",
            reason: format!(
                "machine count must be at least 1, got 0 (sample scale {})",
                sample.scale
            ),
        });
    }
    let machines = sample.machine_count as f64;
    let cores = sample.cores(cores_per_mc) as f64;
    Ok([
        1.0,
        sample.scale / cores,
        sample.scale.sqrt() / cores,
        machines,
        machines.ln(),
        machines * machines,
    ])
}

/// Feature matrix of the whole candidate set, one row per sample.
pub fn feature_matrix(
    samples: &[CandidateSample],
    cores_per_mc: u32,
) -> Result<Array2<f64>, DesignError> {
    let mut flat = Vec::with_capacity(samples.len() * NUM_FEATURES);
    for sample in samples {
        flat.extend_from_slice(&feature_map(sample, cores_per_mc)?);
    }
    Ok(Array2::from_shape_vec((samples.len(), NUM_FEATURES), flat)
        .expect("row count times feature count matches the flat buffer"))
}

/// Per-sample information matrices: the outer product of each feature row
/// with itself, pre- and post-multiplied by the diagonal of reciprocal
/// column means. Output order matches the input rows.
pub fn information_matrices(
    features: &Array2<f64>,
) -> Result<Vec<Array2<f64>>, DesignError> {
    let means = linalg::column_means(&features.view()).ok_or_else(|| DesignError::Input {
        stage: "covariance builder",
        reason: "empty feature matrix".into(),
    })?;
    if let Some(column) = means.iter().position(|&m| m == 0.0) {
        return Err(DesignError::Input {
            stage: "covariance builder",
            reason: format!("feature column {column} has zero mean"),
        });
    }
    Ok(features
        .rows()
        .into_iter()
        .map(|row| {
            let rescaled = &row / &means;
            Array2::from_shape_fn((row.len(), row.len()), |(i, j)| rescaled[i] * rescaled[j])
        })
        .collect())
}

/// Cost coefficients of the budget constraint: benchmarking a sample costs
/// `(scale / scale_min) / machine_count`, so the cheapest configuration on
/// the grid costs 1 per unit weight.
pub fn experiment_costs(samples: &[CandidateSample], params: &DesignParameters) -> Array1<f64> {
    let scale_min = params.scale_min();
    samples
        .iter()
        .map(|s| (s.scale / scale_min) / s.machine_count as f64)
        .collect()
}

/// Keep samples whose solved weight clears [`MIN_WEIGHT_FOR_SELECTION`],
/// ordered by descending weight; exact ties keep ascending sample order so
/// the output is fully deterministic. An empty selection is valid and means
/// no experiment is worth running under the given budget.
pub fn extract_selection(
    samples: &[CandidateSample],
    weights: &Array1<f64>,
    total_parts: u32,
) -> ExperimentSelection {
    let experiments = weights
        .iter()
        .enumerate()
        .filter(|(_, &weight)| weight > MIN_WEIGHT_FOR_SELECTION)
        .sorted_by(|&(i, a), &(j, b)| b.total_cmp(a).then(i.cmp(&j)))
        .map(|(index, &weight)| {
            let sample = samples[index];
            SelectedExperiment {
                partitions: sample.partitions(total_parts),
                scale: sample.scale,
                machine_count: sample.machine_count,
                weight,
            }
        })
        .collect_vec();
    ExperimentSelection { experiments }
}

/// Run the whole design pipeline with default solver options.
pub fn run(params: &DesignParameters) -> Result<ExperimentSelection, DesignError> {
    run_with_options(params, &SolverOptions::default())
}

/// Enumerate candidates, build the convex program and extract the ranked
/// selection from the solved weights.
pub fn run_with_options(
    params: &DesignParameters,
    options: &SolverOptions,
) -> Result<ExperimentSelection, DesignError> {
    params.validate()?;
    let samples = enumerate_samples(params).collect_vec();
    if samples.is_empty() {
        return Err(DesignError::Input {
            stage: "sample enumerator",
            reason: format!(
                "no feasible candidate samples for partitions {}..={} of {}, \
                 machines {}..={}, {} cores per machine",
                params.parts_min,
                params.parts_max,
                params.total_parts,
                params.mcs_min,
                params.mcs_max,
                params.cores_per_mc
            ),
        });
    }
    info!("enumerated {} candidate samples", samples.len());

    let features = feature_matrix(&samples, params.cores_per_mc)?;
    let problem = DesignProblem {
        information_matrices: information_matrices(&features)?,
        cost: LinearConstraint {
            coefficients: experiment_costs(&samples, params),
            upper_bound: params.budget,
        },
    };
    let weights = solver::solve(&problem, options)?;

    let selection = extract_selection(&samples, &weights, params.total_parts);
    info!(
        "{} of {} candidates selected with weight above {}",
        selection.experiments.len(),
        samples.len(),
        MIN_WEIGHT_FOR_SELECTION
    );
    Ok(selection)
}
