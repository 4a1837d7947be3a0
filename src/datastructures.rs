use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors of the design pipeline. Every failure is fatal to the current run;
/// the variants name the stage and the offending input instead of surfacing a
/// raw numeric exception.
#[derive(Debug, Error)]
pub enum DesignError {
    /// A value outside the mathematical domain of a stage, e.g. a
    /// non-positive machine count reaching the feature map.
    #[error("invalid value in {stage}: {reason}")]
    Domain { stage: &'static str, reason: String },
    /// Degenerate input data, e.g. a feature column with zero mean or an
    /// empty candidate grid.
    #[error("degenerate input in {stage}: {reason}")]
    Input { stage: &'static str, reason: String },
    /// No weight vector satisfies all constraints.
    #[error("experiment design infeasible: {reason}")]
    Infeasible { reason: String },
    /// The convex solver did not converge; carries the solver status.
    #[error("optimization failed: {status}")]
    SolverFailed { status: String },
}

/// Parameters of one experiment-design run.
///
/// `parts_*` are dataset partition counts, `mcs_*` are machine counts and
/// `budget` bounds the aggregate cost of the selected experiments, where one
/// experiment at the smallest input fraction on a single machine costs 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignParameters {
    pub parts_min: u32,
    pub parts_max: u32,
    pub total_parts: u32,
    pub mcs_min: u32,
    pub mcs_max: u32,
    pub cores_per_mc: u32,
    pub budget: f64,
    pub num_parts_interpolate: usize,
}

impl DesignParameters {
    /// Smallest input fraction on the candidate grid.
    pub fn scale_min(&self) -> f64 {
        self.parts_min as f64 / self.total_parts as f64
    }

    /// Largest input fraction on the candidate grid.
    pub fn scale_max(&self) -> f64 {
        self.parts_max as f64 / self.total_parts as f64
    }

    /// Reject parameter combinations that would divide by zero further down
    /// the pipeline. Range emptiness (`mcs_min > mcs_max` or a zero
    /// interpolation count) is not an error here; it yields an empty
    /// candidate grid instead.
    pub fn validate(&self) -> Result<(), DesignError> {
        if self.total_parts == 0 {
            return Err(DesignError::Input {
                stage: "design parameters",
                reason: "total partition count must be positive".into(),
            });
        }
        if self.parts_min == 0 {
            return Err(DesignError::Input {
                stage: "design parameters",
                reason: "minimum partition count must be positive".into(),
            });
        }
        if self.cores_per_mc == 0 {
            return Err(DesignError::Input {
                stage: "design parameters",
                reason: "cores per machine must be positive".into(),
            });
        }
        Ok(())
    }
}

/// One feasible (input fraction, machine count) configuration under
/// consideration for benchmarking. Immutable once enumerated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateSample {
    pub scale: f64,
    pub machine_count: u32,
}

impl CandidateSample {
    pub fn cores(&self, cores_per_mc: u32) -> u32 {
        self.machine_count * cores_per_mc
    }

    /// Number of dataset partitions this sample touches.
    pub fn partitions(&self, total_parts: u32) -> u32 {
        (self.scale * total_parts as f64).ceil() as u32
    }
}

/// One experiment the optimizer decided is worth running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedExperiment {
    pub partitions: u32,
    pub scale: f64,
    pub machine_count: u32,
    pub weight: f64,
}

/// The solved design: experiments ordered by descending weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSelection {
    pub experiments: Vec<SelectedExperiment>,
}

impl fmt::Display for ExperimentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Machines, InputFraction, Weight")?;
        for e in &self.experiments {
            writeln!(f, "{}, {:.6}, {:.6}", e.machine_count, e.scale, e.weight)?;
        }
        Ok(())
    }
}
