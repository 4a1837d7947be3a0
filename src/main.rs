use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::error;

use experiment_designer::datastructures::DesignParameters;
use experiment_designer::design;

#[derive(Parser)]
#[command(author, version, about = "Design of experiment for cluster sizing")]
struct Args {
    /// Minimum number of partitions to use in experiments
    #[arg(long)]
    min_parts: u32,
    /// Maximum number of partitions to use in experiments
    #[arg(long)]
    max_parts: u32,
    /// Total number of partitions in the dataset
    #[arg(long)]
    total_parts: u32,
    /// Minimum number of machines to use in experiments
    #[arg(long)]
    min_mcs: u32,
    /// Maximum number of machines to use in experiments
    #[arg(long)]
    max_mcs: u32,
    /// Number of cores or slots available per machine
    #[arg(long, default_value_t = 2)]
    cores_per_mc: u32,
    /// Budget of the experiment design problem
    #[arg(long, default_value_t = 10.0)]
    budget: f64,
    /// Number of samples to interpolate between min_parts and max_parts
    #[arg(long, default_value_t = 16)]
    num_parts_interpolate: usize,
    /// Optional path for the selection as json
    #[arg(short, long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let params = DesignParameters {
        parts_min: args.min_parts,
        parts_max: args.max_parts,
        total_parts: args.total_parts,
        mcs_min: args.min_mcs,
        mcs_max: args.max_mcs,
        cores_per_mc: args.cores_per_mc,
        budget: args.budget,
        num_parts_interpolate: args.num_parts_interpolate,
    };
    if let Err(e) = params.validate() {
        error!("{e}");
        std::process::exit(exitcode::CONFIG);
    }
    let selection = design::run(&params)?;
    if let Some(out) = &args.out {
        serde_json::to_writer_pretty(fs::File::create(out)?, &selection)?;
    }
    print!("{selection}");
    Ok(())
}
