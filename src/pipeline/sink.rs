//! Durable per-batch persistence of enrichment results.

use crate::types::observation::WeatherObservation;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{fs, task};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create checkpoint directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing checkpoint file '{0}'")]
    CsvWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing checkpoint file '{0}'")]
    CsvWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to build observation frame")]
    FrameBuild(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Destination for successfully-enriched batches.
///
/// A batch is persisted at most once, immediately after it succeeds; once
/// written, a checkpoint is never revised. Failing to persist is the one
/// pipeline error that propagates to the caller.
pub trait ResultSink {
    fn persist_batch(
        &self,
        batch_num: usize,
        total_batches: usize,
        observations: &[WeatherObservation],
    ) -> impl std::future::Future<Output = Result<(), SinkError>> + Send;
}

/// Builds the flat checkpoint table for a set of observations.
///
/// Column order is fixed and matches the persisted checkpoint layout; the
/// ignition timestamp is rendered as text so the CSV round-trips without a
/// schema.
pub fn observations_to_dataframe(
    observations: &[WeatherObservation],
) -> Result<DataFrame, PolarsError> {
    let datetimes: Vec<Option<String>> = observations
        .iter()
        .map(|o| {
            o.ignition_datetime
                .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        })
        .collect();

    df!(
        "temperature_c" => observations.iter().map(|o| o.temperature_c).collect::<Vec<_>>(),
        "wind_speed_ms" => observations.iter().map(|o| o.wind_speed_ms).collect::<Vec<_>>(),
        "wind_direction_deg" => observations.iter().map(|o| o.wind_direction_deg).collect::<Vec<_>>(),
        "wind_direction" => observations.iter().map(|o| o.wind_direction.clone()).collect::<Vec<_>>(),
        "humidity_dewpoint_temperature_2m" => observations.iter().map(|o| o.dewpoint_temperature_2m).collect::<Vec<_>>(),
        "soil_temperature_level_1" => observations.iter().map(|o| o.soil_temperature_level_1).collect::<Vec<_>>(),
        "fire_label" => observations.iter().map(|o| o.fire_label.clone()).collect::<Vec<_>>(),
        "ignition_datetime" => datetimes,
    )
}

/// Writes each batch to its own CSV file in a configured folder.
///
/// Checkpoint files are named `weather_data_batch_{batch_num}_of_{total}.csv`,
/// so an interrupted run leaves behind exactly the batches that completed and
/// a re-run over the remaining events can be stitched together externally.
pub struct CsvCheckpointSink {
    folder: PathBuf,
}

impl CsvCheckpointSink {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn batch_filename(batch_num: usize, total_batches: usize) -> String {
        format!("weather_data_batch_{batch_num}_of_{total_batches}.csv")
    }

    /// Writes the observations to `filename` inside the sink's folder,
    /// creating the folder on first use. Returns the full path written.
    pub async fn write_csv(
        &self,
        filename: &str,
        observations: &[WeatherObservation],
    ) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.folder)
            .await
            .map_err(|e| SinkError::DirCreation(self.folder.clone(), e))?;

        let mut df = observations_to_dataframe(observations)?;
        let path = self.folder.join(filename);

        task::spawn_blocking(move || {
            let file = std::fs::File::create(&path)
                .map_err(|e| SinkError::CsvWriteIo(path.clone(), e))?;
            CsvWriter::new(file)
                .include_header(true)
                .finish(&mut df)
                .map_err(|e| SinkError::CsvWritePolars(path.clone(), e))?;
            Ok::<PathBuf, SinkError>(path)
        })
        .await?
    }
}

impl ResultSink for CsvCheckpointSink {
    async fn persist_batch(
        &self,
        batch_num: usize,
        total_batches: usize,
        observations: &[WeatherObservation],
    ) -> Result<(), SinkError> {
        let filename = Self::batch_filename(batch_num, total_batches);
        let path = self.write_csv(&filename, observations).await?;
        info!(
            "Checkpointed batch {batch_num} of {total_batches} ({} rows) to {}",
            observations.len(),
            path.display()
        );
        Ok(())
    }
}
