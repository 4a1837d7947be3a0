use std::fs;
use std::ops::Range;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Ground-truth cost model and sampling plan for synthetic benchmark data.
///
/// `coefficients` weight the model basis
/// `[1, fraction/cores, 1/cores, machines, ln(machines), machines^2]`;
/// `noise` is the relative standard deviation of the measured times.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct DataGeneratorConfig {
    machine_counts: Range<u32>,
    fractions: Vec<f64>,
    cores_per_mc: u32,
    coefficients: [f64; 6],
    noise: f64,
    runs_per_config: usize,
    seed: u64,
    out_path: PathBuf,
}

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the json config
    #[arg(short, long)]
    pub config: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config: DataGeneratorConfig =
        serde_json::from_str(&fs::read_to_string(args.config)?)?;
    let out_path = config.out_path.clone();
    let mut dataframe = generate_data(config)?;
    let mut file = fs::File::create(out_path)?;
    CsvWriter::new(&mut file)
        .has_header(false)
        .finish(&mut dataframe)?;
    Ok(())
}

fn model_time(config: &DataGeneratorConfig, machines: u32, fraction: f64) -> f64 {
    let m = machines as f64;
    let cores = (machines * config.cores_per_mc) as f64;
    let basis = [1.0, fraction / cores, 1.0 / cores, m, m.ln(), m * m];
    basis
        .iter()
        .zip(config.coefficients.iter())
        .map(|(b, c)| b * c)
        .sum()
}

fn generate_data(config: DataGeneratorConfig) -> Result<DataFrame> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut cores_column = Vec::new();
    let mut machines_column = Vec::new();
    let mut fraction_column = Vec::new();
    let mut time_column = Vec::new();
    for machines in config.machine_counts.clone() {
        for &fraction in &config.fractions {
            let base = model_time(&config, machines, fraction);
            let distrib = Normal::new(base, (base * config.noise).abs())?;
            for _ in 0..config.runs_per_config {
                cores_column.push((machines * config.cores_per_mc) as i64);
                machines_column.push(machines as i64);
                fraction_column.push(fraction);
                time_column.push(distrib.sample(&mut rng));
            }
        }
    }
    Ok(df! {
        "cores" => cores_column,
        "machines" => machines_column,
        "fraction" => fraction_column,
        "time" => time_column,
    }?)
}
