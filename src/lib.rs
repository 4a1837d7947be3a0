#![warn(missing_docs)]
//! Performance-modeling toolkit for choosing cost-efficient cluster
//! configurations for a distributed data-processing workload.
//!
//! The heart of the crate is a design-of-experiment optimizer: given bounds
//! on data partitions and machine counts plus a benchmarking budget, it
//! selects which (input fraction, machine count) configurations to measure
//! so that the measurements carry the most statistical information about a
//! performance model (D-optimality). The surrounding modules cover the rest
//! of the workflow: loading benchmark tables, selecting the statistically
//! relevant model terms and fitting a non-negative least squares runtime
//! predictor on the measured points.
//!
//! Example
//! ```rust
//! use experiment_designer::datastructures::DesignParameters;
//! use experiment_designer::design;
//! # use anyhow::Result;
//!
//! fn example() -> Result<()> {
//!     let params = DesignParameters {
//!         parts_min: 8,
//!         parts_max: 64,
//!         total_parts: 64,
//!         mcs_min: 1,
//!         mcs_max: 4,
//!         cores_per_mc: 2,
//!         budget: 2.0,
//!         num_parts_interpolate: 4,
//!     };
//!     let selection = design::run(&params)?;
//!     // One "machines, fraction, weight" line per selected experiment,
//!     // most informative first.
//!     print!("{selection}");
//!     Ok(())
//! }
//! ```

/// Benchmark-table parsing and numeric matrix extraction.
pub mod csv_parser;

/// Core domain types and the error taxonomy of the design pipeline.
pub mod datastructures;

/// The design-of-experiment pipeline: candidate enumeration, feature
/// engineering, information matrices and selection extraction.
pub mod design;

/// Linear-regression based selection of the statistically relevant model
/// terms.
pub mod feature_selection;

/// Small dense linear-algebra kernels shared by the solver and the model
/// fits.
pub mod linalg;

/// Non-negative least squares performance model.
pub mod performance_model;

/// Convex solver for the D-optimal experiment weighting problem.
pub mod solver;

#[cfg(test)]
mod test_utils;
