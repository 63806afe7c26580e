//! Artifact persistence
//!
//! A training run produces three artifacts: the fitted model, the run
//! metrics and the forecast payload. Each lives in its own JSON file inside
//! the artifact directory and is replaced by writing a temporary file in the
//! same directory and renaming it over the slot, so a reader sees either the
//! previous file or the new one, never a partial body.

use crate::data::DATE_FORMAT;
use crate::error::{ForecastError, Result};
use crate::models::ModelOrder;
use chrono::{Days, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

/// One of the three persisted artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSlot {
    /// Fitted model state
    Model,
    /// Run metrics
    Metrics,
    /// History and forecast payload
    Forecast,
}

impl ArtifactSlot {
    /// Every slot, in write order
    pub const ALL: [ArtifactSlot; 3] = [
        ArtifactSlot::Model,
        ArtifactSlot::Metrics,
        ArtifactSlot::Forecast,
    ];

    /// File name of the slot inside the artifact directory
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactSlot::Model => "arima_model.json",
            ArtifactSlot::Metrics => "metrics.json",
            ArtifactSlot::Forecast => "forecast.json",
        }
    }
}

impl fmt::Display for ArtifactSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactSlot::Model => "model",
            ArtifactSlot::Metrics => "metrics",
            ArtifactSlot::Forecast => "forecast",
        };
        f.write_str(name)
    }
}

/// Metrics of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Selected order, serialised as `[p, d, q]`
    pub best_order: ModelOrder,
    /// Held-out RMSE of the selected order
    pub rmse: f64,
    /// Length of the held-out window
    pub test_data_size: usize,
}

/// History and forecast, index-aligned per pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    /// Historical dates as `YYYY-MM-DD`
    pub history_dates: Vec<String>,
    /// Historical values
    pub history_values: Vec<f64>,
    /// Forecast dates as `YYYY-MM-DD`, starting the day after the history
    pub forecast_dates: Vec<String>,
    /// Forecast values
    pub forecast_values: Vec<f64>,
}

impl ForecastPayload {
    /// Check the alignment and date continuity invariants
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ForecastError::ValidationError(msg));

        if self.history_dates.len() != self.history_values.len() {
            return invalid(format!(
                "history has {} dates but {} values",
                self.history_dates.len(),
                self.history_values.len()
            ));
        }
        if self.forecast_dates.len() != self.forecast_values.len() {
            return invalid(format!(
                "forecast has {} dates but {} values",
                self.forecast_dates.len(),
                self.forecast_values.len()
            ));
        }

        let history = parse_dates(&self.history_dates)?;
        let forecast = parse_dates(&self.forecast_dates)?;

        if let (Some(&first), None) = (forecast.first(), history.last()) {
            return invalid(format!(
                "forecast starts at {} without any history",
                first.format(DATE_FORMAT)
            ));
        }

        let timeline: Vec<&NaiveDate> = history.iter().chain(forecast.iter()).collect();
        for pair in timeline.windows(2) {
            if pair[0].checked_add_days(Days::new(1)) != Some(*pair[1]) {
                return invalid(format!(
                    "dates {} and {} are not consecutive",
                    pair[0].format(DATE_FORMAT),
                    pair[1].format(DATE_FORMAT)
                ));
            }
        }

        Ok(())
    }
}

fn parse_dates(dates: &[String]) -> Result<Vec<NaiveDate>> {
    dates
        .iter()
        .map(|s| {
            NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| {
                ForecastError::ValidationError(format!("invalid date '{}'", s))
            })
        })
        .collect()
}

/// File-backed store for the artifacts of the latest training run.
///
/// Only one writer may use a directory at a time; concurrent readers are
/// fine.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Artifact directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a slot
    pub fn path(&self, slot: ArtifactSlot) -> PathBuf {
        self.dir.join(slot.file_name())
    }

    /// Whether a slot has been written
    pub fn exists(&self, slot: ArtifactSlot) -> bool {
        self.path(slot).is_file()
    }

    /// Replace all three artifacts of a run.
    ///
    /// Every slot is serialised to a temporary file first; slots are only
    /// renamed into place once all three are staged, so a failure while
    /// serialising leaves the previous run untouched. A failed rename is
    /// logged with the slots already replaced.
    pub fn write_run<M: Serialize>(
        &self,
        model: &M,
        metrics: &RunMetrics,
        forecast: &ForecastPayload,
    ) -> Result<()> {
        forecast.validate()?;
        fs::create_dir_all(&self.dir)?;

        let staged = [
            (ArtifactSlot::Model, self.stage(ArtifactSlot::Model, model)?),
            (ArtifactSlot::Metrics, self.stage(ArtifactSlot::Metrics, metrics)?),
            (ArtifactSlot::Forecast, self.stage(ArtifactSlot::Forecast, forecast)?),
        ];

        let mut committed = Vec::with_capacity(staged.len());
        for (slot, file) in staged {
            if let Err(err) = self.commit(slot, file) {
                error!(
                    dir = %self.dir.display(),
                    failed = %slot,
                    committed = ?committed,
                    "Artifact set is mixed: committed slots hold the new run"
                );
                return Err(err);
            }
            committed.push(slot);
        }

        info!(dir = %self.dir.display(), "Artifacts saved");
        Ok(())
    }

    /// Replace the model artifact
    pub fn write_model<M: Serialize>(&self, model: &M) -> Result<()> {
        self.write_slot(ArtifactSlot::Model, model)
    }

    /// Replace the metrics artifact
    pub fn write_metrics(&self, metrics: &RunMetrics) -> Result<()> {
        self.write_slot(ArtifactSlot::Metrics, metrics)
    }

    /// Replace the forecast artifact
    pub fn write_forecast(&self, forecast: &ForecastPayload) -> Result<()> {
        forecast.validate()?;
        self.write_slot(ArtifactSlot::Forecast, forecast)
    }

    /// Read the metrics artifact
    pub fn read_metrics(&self) -> Result<RunMetrics> {
        self.read_slot(ArtifactSlot::Metrics)
    }

    /// Read the forecast artifact
    pub fn read_forecast(&self) -> Result<ForecastPayload> {
        self.read_slot(ArtifactSlot::Forecast)
    }

    /// Read the model artifact as `T`
    pub fn read_model<T: DeserializeOwned>(&self) -> Result<T> {
        self.read_slot(ArtifactSlot::Model)
    }

    /// Read any slot as untyped JSON
    pub fn read_raw(&self, slot: ArtifactSlot) -> Result<serde_json::Value> {
        self.read_slot(slot)
    }

    fn write_slot<T: Serialize>(&self, slot: ArtifactSlot, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let file = self.stage(slot, value)?;
        self.commit(slot, file)
    }

    /// Serialise `value` into a synced temporary file next to the slot
    fn stage<T: Serialize>(&self, slot: ArtifactSlot, value: &T) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{}.", slot.file_name()))
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            serde_json::to_writer(&mut writer, value)?;
            writer.flush()?;
        }
        file.as_file().sync_all()?;

        debug!(%slot, path = %file.path().display(), "staged artifact");
        Ok(file)
    }

    /// Atomically rename a staged file over its slot
    fn commit(&self, slot: ArtifactSlot, file: NamedTempFile) -> Result<()> {
        file.persist(self.path(slot))
            .map_err(|err| ForecastError::IoError(err.error))?;
        Ok(())
    }

    fn read_slot<T: DeserializeOwned>(&self, slot: ArtifactSlot) -> Result<T> {
        let file = match File::open(self.path(slot)) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ForecastError::ArtifactMissing(slot))
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
