use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use experiment_designer::csv_parser;
use experiment_designer::feature_selection::KeyFeatureSelector;

#[derive(Parser)]
#[command(author, version, about = "Select the key model terms from benchmark data")]
struct Args {
    /// Path to the benchmark csv (cores, machines, fraction, time rows)
    #[arg(short, long)]
    data: PathBuf,
    /// Output path for the selected training matrix
    #[arg(short, long)]
    out: PathBuf,
    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let df = csv_parser::read_training_csv(&args.data)?;
    let points = csv_parser::training_points(&df)?;
    let selector = KeyFeatureSelector::fit(&points.view())?;
    info!(
        "selected terms {:?} with coefficients {}",
        selector.selected_terms(),
        selector.coefficients()
    );
    let selected = selector.transform(&points.view())?;
    csv_parser::write_feature_csv(&selected, &args.out)?;
    info!(
        "wrote {} selected training rows to {}",
        selected.nrows(),
        args.out.display()
    );
    Ok(())
}
