use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use ndarray::{array, s};

use experiment_designer::csv_parser;
use experiment_designer::feature_selection::KeyFeatureSelector;
use experiment_designer::performance_model::PerformanceModel;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Fit a runtime model on benchmark data and predict cluster configurations"
)]
struct Args {
    /// Path to the benchmark csv (cores, machines, fraction, time rows)
    #[arg(short, long)]
    data: PathBuf,
    /// Optional path to save the selected training matrix
    #[arg(long)]
    save: Option<PathBuf>,
    /// Number of cores or slots available per machine
    #[arg(long, default_value_t = 2)]
    cores_per_mc: u32,
    /// Machine counts to predict the runtime for, at full input fraction
    predictions: Vec<u32>,
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
    info!("selected terms {:?}", selector.selected_terms());
    let training = selector.transform(&points.view())?;
    if let Some(save) = &args.save {
        csv_parser::write_feature_csv(&training, save)?;
    }

    let model = PerformanceModel::fit(&training.view())?;
    info!(
        "mean relative training error {:.2}%",
        model.mean_relative_error(&training.view()) * 100.0
    );
    info!("model coefficients {}", model.coefficients());

    for machines in args.predictions {
        let cores = machines * args.cores_per_mc;
        let point = array![[cores as f64, machines as f64, 1.0, 0.0]];
        let features = selector.transform(&point.view())?;
        let predicted = model.predict(&features.slice(s![0, 1..]));
        println!("{machines},{predicted}");
    }
    Ok(())
}
