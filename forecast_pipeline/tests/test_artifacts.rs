use forecast_pipeline::artifacts::{ArtifactSlot, ArtifactStore, ForecastPayload, RunMetrics};
use forecast_pipeline::{ForecastError, ModelOrder};
use pretty_assertions::assert_eq;
use serde::ser::{Error as _, Serializer};
use serde::Serialize;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

/// Model whose serialisation fails partway through a run
struct Unserialisable;

impl Serialize for Unserialisable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("disk full"))
    }
}

fn metrics(rmse: f64) -> RunMetrics {
    RunMetrics {
        best_order: ModelOrder::new(5, 1, 0),
        rmse,
        test_data_size: 365,
    }
}

fn payload() -> ForecastPayload {
    ForecastPayload {
        history_dates: vec!["2023-12-30".into(), "2023-12-31".into()],
        history_values: vec![410.0, 415.0],
        forecast_dates: vec!["2024-01-01".into(), "2024-01-02".into()],
        forecast_values: vec![417.5, 419.25],
    }
}

fn store() -> (TempDir, ArtifactStore) {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path().join("model"));
    (dir, store)
}

#[test]
fn test_metrics_round_trip() {
    let (_dir, store) = store();
    store.write_metrics(&metrics(12.5)).unwrap();

    assert_eq!(store.read_metrics().unwrap(), metrics(12.5));
    assert_eq!(
        store.read_raw(ArtifactSlot::Metrics).unwrap(),
        json!({"best_order": [5, 1, 0], "rmse": 12.5, "test_data_size": 365})
    );
}

#[test]
fn test_forecast_round_trip() {
    let (_dir, store) = store();
    store.write_forecast(&payload()).unwrap();
    assert_eq!(store.read_forecast().unwrap(), payload());
}

#[test]
fn test_unwritten_slots_are_missing() {
    let (_dir, store) = store();
    for slot in ArtifactSlot::ALL {
        assert!(!store.exists(slot));
        assert!(matches!(
            store.read_raw(slot),
            Err(ForecastError::ArtifactMissing(missing)) if missing == slot
        ));
    }
}

#[test]
fn test_write_run_replaces_all_slots() {
    let (_dir, store) = store();
    store
        .write_run(&json!({"order": [1, 1, 0]}), &metrics(3.0), &payload())
        .unwrap();
    store
        .write_run(&json!({"order": [5, 1, 1]}), &metrics(2.0), &payload())
        .unwrap();

    assert_eq!(store.read_metrics().unwrap().rmse, 2.0);
    assert_eq!(
        store.read_raw(ArtifactSlot::Model).unwrap(),
        json!({"order": [5, 1, 1]})
    );
    assert!(ArtifactSlot::ALL.iter().all(|&slot| store.exists(slot)));
}

#[test]
fn test_failed_run_keeps_previous_artifacts() {
    let (_dir, store) = store();
    store
        .write_run(&json!({"order": [1, 1, 0]}), &metrics(3.0), &payload())
        .unwrap();

    let err = store
        .write_run(&Unserialisable, &metrics(1.0), &payload())
        .unwrap_err();
    assert!(matches!(err, ForecastError::JsonError(_)));

    assert_eq!(store.read_metrics().unwrap(), metrics(3.0));
    assert_eq!(store.read_forecast().unwrap(), payload());
    assert_eq!(
        store.read_raw(ArtifactSlot::Model).unwrap(),
        json!({"order": [1, 1, 0]})
    );

    // No staged files left behind
    let leftovers: Vec<_> = fs::read_dir(store.dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_failed_rename_stops_at_the_failing_slot() {
    let (_dir, store) = store();
    store
        .write_run(&json!({"order": [1, 1, 0]}), &metrics(3.0), &payload())
        .unwrap();

    // A non-empty directory in place of metrics.json cannot be renamed over
    fs::remove_file(store.path(ArtifactSlot::Metrics)).unwrap();
    fs::create_dir(store.path(ArtifactSlot::Metrics)).unwrap();
    fs::write(store.path(ArtifactSlot::Metrics).join("keep"), b"x").unwrap();

    let mut next = payload();
    next.forecast_values = vec![500.0, 501.0];
    let err = store
        .write_run(&json!({"order": [2, 1, 0]}), &metrics(1.0), &next)
        .unwrap_err();

    assert!(matches!(err, ForecastError::IoError(_)));
    assert_eq!(
        store.read_raw(ArtifactSlot::Model).unwrap(),
        json!({"order": [2, 1, 0]})
    );
    assert_eq!(store.read_forecast().unwrap(), payload());
    let leftovers = fs::read_dir(store.dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_partial_temp_file_does_not_affect_readers() {
    let (_dir, store) = store();
    store.write_metrics(&metrics(4.0)).unwrap();

    // A crash between staging and rename leaves a truncated temp file
    fs::write(store.dir().join(".metrics.json.crash.tmp"), b"{\"best_ord").unwrap();

    assert_eq!(store.read_metrics().unwrap(), metrics(4.0));
}

#[test]
fn test_invalid_payload_is_not_written() {
    let (_dir, store) = store();
    let mut bad = payload();
    bad.forecast_dates[0] = "2024-01-05".into();

    assert!(matches!(
        store.write_forecast(&bad),
        Err(ForecastError::ValidationError(_))
    ));
    assert!(!store.exists(ArtifactSlot::Forecast));
}

#[test]
fn test_corrupt_artifact_is_json_error() {
    let (_dir, store) = store();
    fs::create_dir_all(store.dir()).unwrap();
    fs::write(store.path(ArtifactSlot::Forecast), b"not json").unwrap();

    assert!(matches!(
        store.read_forecast(),
        Err(ForecastError::JsonError(_))
    ));
}
