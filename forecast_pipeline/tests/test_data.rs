use chrono::NaiveDate;
use forecast_pipeline::data::{DataLoader, TimeSeriesData};
use forecast_pipeline::ForecastError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_loads_daily_series() {
    let file = csv_file(&[
        "date,value",
        "2023-01-01,112",
        "2023-01-02,118",
        "2023-01-03,132",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(data.len(), 3);
    assert_eq!(data.values(), &[112.0, 118.0, 132.0]);
    assert_eq!(data.first_date(), Some(day(2023, 1, 1)));
    assert_eq!(data.last_date(), Some(day(2023, 1, 3)));
}

#[test]
fn test_unsorted_rows_are_ordered_by_date() {
    let file = csv_file(&[
        "Date,Passengers",
        "2023-01-03,132",
        "2023-01-01,112",
        "2023-01-02,118",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(
        data.date_strings(),
        vec!["2023-01-01", "2023-01-02", "2023-01-03"]
    );
    assert_eq!(data.values(), &[112.0, 118.0, 132.0]);
}

#[test]
fn test_named_value_column() {
    let file = csv_file(&[
        "date,other,passengers",
        "2023-01-01,1,10",
        "2023-01-02,2,20",
    ]);

    let data = DataLoader::from_csv_with_column(file.path(), "passengers").unwrap();
    assert_eq!(data.values(), &[10.0, 20.0]);

    let err = DataLoader::from_csv_with_column(file.path(), "missing").unwrap_err();
    assert!(matches!(err, ForecastError::DataUnavailable(_)));
}

#[rstest]
#[case::gap(&["date,value", "2023-01-01,1", "2023-01-03,2"])]
#[case::duplicate(&["date,value", "2023-01-01,1", "2023-01-01,2"])]
#[case::bad_value(&["date,value", "2023-01-01,abc"])]
#[case::bad_date(&["date,value", "01/01/2023,1"])]
#[case::no_rows(&["date,value"])]
#[case::no_date_column(&["day,value", "2023-01-01,1"])]
fn test_rejected_inputs_are_data_unavailable(#[case] lines: &[&str]) {
    let file = csv_file(lines);
    let err = DataLoader::from_csv(file.path()).unwrap_err();
    assert!(
        matches!(err, ForecastError::DataUnavailable(_)),
        "unexpected error {:?}",
        err
    );
}

#[test]
fn test_missing_file_is_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = DataLoader::from_csv(dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, ForecastError::DataUnavailable(_)));
}

#[test]
fn test_new_rejects_gaps_and_length_mismatch() {
    assert!(TimeSeriesData::new(vec![day(2023, 1, 1), day(2023, 1, 3)], vec![1.0, 2.0]).is_err());
    assert!(TimeSeriesData::new(vec![day(2023, 1, 1)], vec![1.0, 2.0]).is_err());
}

#[test]
fn test_concat_requires_adjacent_series() {
    let a = TimeSeriesData::from_values(day(2023, 1, 1), vec![1.0, 2.0]).unwrap();
    let b = TimeSeriesData::from_values(day(2023, 1, 3), vec![3.0]).unwrap();
    let c = TimeSeriesData::from_values(day(2023, 1, 4), vec![4.0]).unwrap();

    assert_eq!(a.concat(&b).unwrap().values(), &[1.0, 2.0, 3.0]);
    assert!(a.concat(&c).is_err());
}
