use std::path::Path;

use ndarray::arr2;

use super::{
    parse_training_rows, read_training_csv, training_points, write_feature_csv, TRAINING_COLUMNS,
};

#[test]
fn test_parse_quirky_rows() {
    let content = "\
&cores,machines,fraction,time\n\
4,2,0.5,30.0 trailing fields after a space are ignored\n\
8,4,1.0,22.5\n\
bad,row\n\
2,1,0.25,37.5,extra,fields\n";
    let df = parse_training_rows(content).unwrap();
    assert_eq!(df.height(), 3);
    assert_eq!(df.get_column_names(), TRAINING_COLUMNS);
    let cores = df.column("cores").unwrap().i64().unwrap();
    assert_eq!(cores.into_no_null_iter().collect::<Vec<_>>(), vec![4, 8, 2]);
    let times = df.column("time").unwrap().f64().unwrap();
    assert_eq!(
        times.into_no_null_iter().collect::<Vec<_>>(),
        vec![30.0, 22.5, 37.5]
    );
}

#[test]
fn test_parse_rejects_empty_input() {
    assert!(parse_training_rows("& only a comment\n").is_err());
}

#[test]
fn test_read_training_csv_file() {
    let df = read_training_csv(Path::new("data/test/quirky_format.csv")).unwrap();
    assert_eq!(df.height(), 3);
}

#[test]
fn test_write_feature_csv_is_headerless() {
    let rows = arr2(&[[37.5, 1.0, 0.125], [22.5, 1.0, 0.25]]);
    let path = std::env::temp_dir().join("experiment_designer_feature_csv_test.csv");
    write_feature_csv(&rows, &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 2);
    assert!(written.starts_with("37.5,"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_training_points_matrix() {
    let df = read_training_csv(Path::new("data/test/synthetic_model.csv")).unwrap();
    let points = training_points(&df).unwrap();
    assert_eq!(points.nrows(), 20);
    assert_eq!(points.ncols(), 4);
    // First row: 2 cores, 1 machine, quarter of the input, 37.5 seconds.
    assert_eq!(points[(0, 0)], 2.0);
    assert_eq!(points[(0, 1)], 1.0);
    assert_eq!(points[(0, 2)], 0.25);
    assert_eq!(points[(0, 3)], 37.5);
}
