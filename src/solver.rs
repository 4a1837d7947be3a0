use itertools::Itertools;
use log::{debug, info};
use ndarray::{Array1, Array2};

use crate::datastructures::DesignError;
use crate::linalg;

#[cfg(test)]
mod tests;

/// Linear inequality `coefficients . w <= upper_bound` over sample weights.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub coefficients: Array1<f64>,
    pub upper_bound: f64,
}

/// D-optimal design problem in standard convex form: maximize
/// `log det(sum_i w_i * A_i)` over weights `0 <= w_i <= 1` subject to the
/// linear cost constraint.
///
/// The formulation is plain data; swapping in a different log-det solver
/// only touches [`solve`].
#[derive(Debug, Clone)]
pub struct DesignProblem {
    pub information_matrices: Vec<Array2<f64>>,
    pub cost: LinearConstraint,
}

/// Termination controls for [`solve`].
///
/// `tolerance` bounds the relative duality gap, which in turn bounds the
/// objective suboptimality of the returned weights.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            tolerance: 1e-4,
        }
    }
}

/// Solve the design problem with deterministic Frank-Wolfe ascent.
///
/// Per iteration: the gradient of the log-determinant is
/// `g_i = tr(M(w)^-1 A_i)` via a Cholesky factorization of the weighted sum
/// `M(w)`; the linear maximization oracle over the box-plus-budget polytope
/// is a fractional knapsack ordered by gradient-to-cost ratio; the step size
/// comes from an exact line search (bisection on the directional
/// derivative). Iterates stay feasible by construction, so every returned
/// weight lies in `[0, 1]` and the solution cost never exceeds the budget.
///
/// One-shot and deterministic: identical inputs produce identical weights.
pub fn solve(
    problem: &DesignProblem,
    options: &SolverOptions,
) -> Result<Array1<f64>, DesignError> {
    let matrices = &problem.information_matrices;
    let costs = &problem.cost.coefficients;
    let budget = problem.cost.upper_bound;
    let num_samples = matrices.len();
    validate_problem(problem)?;

    if budget <= 0.0 {
        // Only the all-zero design satisfies a non-positive budget and its
        // log-determinant is undefined, so there is no interior start.
        return Err(DesignError::Infeasible {
            reason: format!("budget {budget} admits no experiment with positive weight"),
        });
    }

    // Strictly feasible uniform start: spend the budget (or the box bound,
    // whichever binds first) evenly over all candidates.
    let total_cost = costs.sum();
    let initial_weight = f64::min(1.0, budget / total_cost);
    let mut weights = Array1::<f64>::from_elem(num_samples, initial_weight);
    let mut summed = weighted_sum(matrices, &weights);

    let mut factor = linalg::cholesky(&summed.view()).ok_or_else(|| {
        DesignError::SolverFailed {
            status: "information matrix is singular at the initial design; \
                     the candidate set does not span the feature space"
                .into(),
        }
    })?;
    let mut objective = linalg::log_det(&factor.view());

    for iteration in 0..options.max_iterations {
        let inverse = linalg::cholesky_inverse(&factor.view());
        let gradient: Vec<f64> = matrices
            .iter()
            .map(|a| frobenius_dot(&inverse, a))
            .collect();

        let vertex = knapsack_oracle(&gradient, costs, budget);
        let gap: f64 = gradient
            .iter()
            .zip(vertex.iter().zip(weights.iter()))
            .map(|(g, (s, w))| g * (s - w))
            .sum();

        if gap <= options.tolerance * objective.abs().max(1.0) {
            info!(
                "design solve converged after {iteration} iterations \
                 (objective {objective:.6}, duality gap {gap:.3e})"
            );
            return Ok(weights);
        }
        if iteration % 1000 == 0 {
            debug!("iteration {iteration}: objective {objective:.6}, gap {gap:.3e}");
        }

        let vertex_sum = weighted_sum(matrices, &vertex);
        let step = line_search(&summed, &vertex_sum);
        weights.zip_mut_with(&vertex, |w, s| *w = (1.0 - step) * *w + step * s);
        summed.zip_mut_with(&vertex_sum, |m, v| *m = (1.0 - step) * *m + step * v);

        factor = linalg::cholesky(&summed.view()).ok_or_else(|| {
            DesignError::SolverFailed {
                status: format!(
                    "weighted information matrix lost positive definiteness \
                     at iteration {iteration}"
                ),
            }
        })?;
        let next_objective = linalg::log_det(&factor.view());
        if !next_objective.is_finite() {
            return Err(DesignError::SolverFailed {
                status: format!("objective became non-finite at iteration {iteration}"),
            });
        }
        objective = next_objective;
    }

    Err(DesignError::SolverFailed {
        status: format!(
            "duality gap above tolerance {} after {} iterations",
            options.tolerance, options.max_iterations
        ),
    })
}

fn validate_problem(problem: &DesignProblem) -> Result<(), DesignError> {
    let num_samples = problem.information_matrices.len();
    if num_samples == 0 {
        return Err(DesignError::Input {
            stage: "experiment optimizer",
            reason: "no information matrices to weight".into(),
        });
    }
    if problem.cost.coefficients.len() != num_samples {
        return Err(DesignError::Input {
            stage: "experiment optimizer",
            reason: format!(
                "{} cost coefficients for {} information matrices",
                problem.cost.coefficients.len(),
                num_samples
            ),
        });
    }
    let dim = problem.information_matrices[0].nrows();
    for (index, matrix) in problem.information_matrices.iter().enumerate() {
        if matrix.nrows() != dim || matrix.ncols() != dim {
            return Err(DesignError::Input {
                stage: "experiment optimizer",
                reason: format!("information matrix {index} is not {dim}x{dim}"),
            });
        }
    }
    for (index, &cost) in problem.cost.coefficients.iter().enumerate() {
        if !(cost > 0.0) || !cost.is_finite() {
            return Err(DesignError::Input {
                stage: "experiment optimizer",
                reason: format!("sample {index} has non-positive cost {cost}"),
            });
        }
    }
    Ok(())
}

fn weighted_sum(matrices: &[Array2<f64>], weights: &Array1<f64>) -> Array2<f64> {
    let dim = matrices[0].nrows();
    let mut sum = Array2::<f64>::zeros((dim, dim));
    for (matrix, &weight) in matrices.iter().zip(weights.iter()) {
        if weight != 0.0 {
            sum.zip_mut_with(matrix, |s, m| *s += weight * m);
        }
    }
    sum
}

fn frobenius_dot(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Linear maximization oracle: the vertex of
/// `{0 <= s <= 1, costs . s <= budget}` maximizing `gradient . s`.
///
/// A fractional knapsack: fill coordinates by descending gradient-to-cost
/// ratio until the budget is exhausted, ties broken by index.
fn knapsack_oracle(gradient: &[f64], costs: &Array1<f64>, budget: f64) -> Array1<f64> {
    let order = (0..gradient.len())
        .sorted_by(|&a, &b| {
            (gradient[b] / costs[b])
                .total_cmp(&(gradient[a] / costs[a]))
                .then(a.cmp(&b))
        })
        .collect_vec();
    let mut vertex = Array1::<f64>::zeros(gradient.len());
    let mut remaining = budget;
    for index in order {
        if gradient[index] <= 0.0 || remaining <= 0.0 {
            break;
        }
        let take = f64::min(1.0, remaining / costs[index]);
        vertex[index] = take;
        remaining -= take * costs[index];
    }
    vertex
}

/// Exact line search for the step towards the oracle vertex: bisection on
/// the directional derivative `tr((M + t D)^-1 D)` of the log-determinant
/// along `D = vertex_sum - summed`, which is decreasing in `t` by concavity.
fn line_search(summed: &Array2<f64>, vertex_sum: &Array2<f64>) -> f64 {
    let direction = vertex_sum - summed;
    let derivative = |step: f64| -> Option<f64> {
        let at_step = summed + &(step * &direction);
        let factor = linalg::cholesky(&at_step.view())?;
        let inverse = linalg::cholesky_inverse(&factor.view());
        Some(frobenius_dot(&inverse, &direction))
    };

    let mut hi = 1.0;
    let mut hi_derivative = derivative(hi);
    // The full step can leave the positive definite cone when the vertex
    // design is rank deficient; shrink until the derivative is defined.
    while hi_derivative.is_none() && hi > 1e-12 {
        hi *= 0.5;
        hi_derivative = derivative(hi);
    }
    match hi_derivative {
        None => 1e-12,
        // Derivative still non-negative at the end of the segment: the
        // objective is increasing all the way, take the largest valid step.
        Some(d) if d >= 0.0 => hi,
        Some(_) => {
            let mut lo = 0.0;
            for _ in 0..48 {
                let mid = 0.5 * (lo + hi);
                match derivative(mid) {
                    Some(d) if d >= 0.0 => lo = mid,
                    _ => hi = mid,
                }
            }
            // The objective is non-decreasing on [0, lo], so the step can
            // never move below the current iterate's value.
            lo.max(1e-12)
        }
    }
}
