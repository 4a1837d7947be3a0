use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::warn;
use ndarray::Array2;
use polars::prelude::*;

#[cfg(test)]
mod tests;

/// Column names of the benchmark table, in row order.
pub const TRAINING_COLUMNS: [&str; 4] = ["cores", "machines", "fraction", "time"];

/// Read a benchmark table of `(cores, machines, fraction, time)` rows.
///
/// The historical on-disk format: each line is cut at the first whitespace,
/// lines whose first field starts with `&` are comments, and the surviving
/// field is comma separated with any fields past the fourth ignored.
pub fn read_training_csv(path: &Path) -> Result<DataFrame> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read training data from {}", path.display()))?;
    parse_training_rows(&content)
        .with_context(|| format!("failed to parse training data from {}", path.display()))
}

/// Parse benchmark rows from an in-memory string. See [`read_training_csv`]
/// for the format.
pub fn parse_training_rows(content: &str) -> Result<DataFrame> {
    let mut cleaned = String::new();
    let mut malformed = 0_usize;
    for line in content.lines() {
        let Some(field) = line.split_whitespace().next() else { continue };
        if field.starts_with('&') {
            continue;
        }
        let columns = field.split(',').take(4).collect_vec();
        if columns.len() < 4 || columns.iter().any(|c| c.is_empty()) {
            malformed += 1;
            continue;
        }
        cleaned.push_str(&columns.join(","));
        cleaned.push('\n');
    }
    if malformed > 0 {
        warn!("skipped {malformed} malformed training rows");
    }
    if cleaned.is_empty() {
        anyhow::bail!("no usable training rows");
    }

    let mut df = CsvReader::new(Cursor::new(cleaned.into_bytes()))
        .has_header(false)
        .finish()?;
    df.set_column_names(&TRAINING_COLUMNS)?;
    Ok(df
        .lazy()
        .select([
            col("cores").cast(DataType::Int64),
            col("machines").cast(DataType::Int64),
            col("fraction").cast(DataType::Float64),
            col("time").cast(DataType::Float64),
        ])
        .collect()?)
}

/// The benchmark table as an `n x 4` float matrix in [`TRAINING_COLUMNS`]
/// order, the shape the feature selector and performance model consume.
pub fn training_points(df: &DataFrame) -> Result<Array2<f64>> {
    Ok(df.to_ndarray::<Float64Type>()?)
}

/// Persist a numeric row matrix as a headerless CSV, the exchange format of
/// the selected-feature matrix (`time, 1.0, term...` per row).
pub fn write_feature_csv(rows: &Array2<f64>, path: &Path) -> Result<()> {
    let series = rows
        .columns()
        .into_iter()
        .enumerate()
        .map(|(index, column)| Series::new(&format!("column_{index}"), column.to_vec()))
        .collect::<Vec<_>>();
    let mut df = DataFrame::new(series)?;
    let mut file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .has_header(false)
        .finish(&mut df)?;
    Ok(())
}
