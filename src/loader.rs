//! Loading wildfire event tables from files or URLs into typed records.
//!
//! This is the upstream collaborator of the pipeline: it only needs to expose
//! stable column access by name. Local `.csv` and `.parquet` paths are read
//! directly; `http(s)` URLs are downloaded to a temporary file first and then
//! read by the same path. The numeric timestamp column runs through the
//! normalizer, so malformed dates come out as unknown rather than failing
//! the load.

use crate::timestamp::parse_numeric_timestamp;
use crate::types::event::WildfireEvent;
use bon::bon;
use log::info;
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::task;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The file '{0}' does not exist")]
    FileNotFound(PathBuf),

    #[error("Unsupported file format for '{0}' (expected .csv or .parquet)")]
    UnsupportedFormat(String),

    #[error("Network request failed for {0}")]
    Download(String, #[source] reqwest::Error),

    #[error("I/O error reading '{0}'")]
    Io(String, #[source] std::io::Error),

    #[error("Failed to parse tabular data from '{0}'")]
    Parse(String, #[source] PolarsError),

    #[error("Required column '{0}' not found")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Names of the event columns in the source table.
///
/// The defaults match the British Columbia historical wildfire dataset this
/// pipeline was first built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventColumns {
    pub label: String,
    pub timestamp: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for EventColumns {
    fn default() -> Self {
        Self {
            label: "FIRELABEL".to_string(),
            timestamp: "IGNITION_DATE".to_string(),
            latitude: "LATITUDE".to_string(),
            longitude: "LONGITUDE".to_string(),
        }
    }
}

/// Reads wildfire event tables into [`WildfireEvent`] records.
///
/// # Examples
///
/// ```no_run
/// # use fireweather::{EventLoader, LoadError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), LoadError> {
/// let loader = EventLoader::new();
/// let events = loader
///     .load_events()
///     .source("data/bc_wildfires.csv")
///     .call()
///     .await?;
/// println!("loaded {} events", events.len());
/// # Ok(())
/// # }
/// ```
pub struct EventLoader {
    client: reqwest::Client,
}

impl Default for EventLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl EventLoader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Loads events from a local path or an `http(s)` URL.
    ///
    /// * `.source(&str)`: **Required.** Path or URL of a `.csv` or `.parquet` table.
    /// * `.columns(EventColumns)`: Optional. Column-name mapping; defaults to
    ///   the BC wildfire dataset names.
    #[builder]
    pub async fn load_events(
        &self,
        source: &str,
        columns: Option<EventColumns>,
    ) -> Result<Vec<WildfireEvent>, LoadError> {
        let columns = columns.unwrap_or_default();
        let df = if source.starts_with("http://") || source.starts_with("https://") {
            self.download_frame(source).await?
        } else {
            let path = Path::new(source);
            if !path.exists() {
                return Err(LoadError::FileNotFound(path.to_path_buf()));
            }
            read_frame(path.to_path_buf(), source.to_string()).await?
        };
        info!("Loaded {} rows from {source}", df.height());
        events_from_dataframe(&df, &columns)
    }

    /// Downloads the table to a temporary file, then reads it like a local one.
    async fn download_frame(&self, url: &str) -> Result<DataFrame, LoadError> {
        let extension = url_extension(url).ok_or_else(|| LoadError::UnsupportedFormat(url.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoadError::Download(url.to_string(), e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::Download(url.to_string(), e))?;

        let url_owned = url.to_string();
        let staged = task::spawn_blocking(move || {
            let mut temp_file = tempfile::Builder::new()
                .suffix(&format!(".{extension}"))
                .tempfile()
                .map_err(|e| LoadError::Io(url_owned.clone(), e))?;
            temp_file
                .write_all(&bytes)
                .and_then(|_| temp_file.flush())
                .map_err(|e| LoadError::Io(url_owned.clone(), e))?;
            Ok::<(NamedTempFile, String), LoadError>((temp_file, url_owned))
        })
        .await??;

        let (temp_file, url_owned) = staged;
        let df = read_frame(temp_file.path().to_path_buf(), url_owned).await?;
        Ok(df)
    }
}

/// Extracts the lowercase file extension from a path or URL, ignoring query strings.
fn url_extension(source: &str) -> Option<String> {
    let trimmed = source.split(['?', '#']).next()?;
    let (_, extension) = trimmed.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        ext @ ("csv" | "parquet") => Some(ext.to_string()),
        _ => None,
    }
}

/// Reads a `.csv` or `.parquet` file on a blocking task.
async fn read_frame(path: PathBuf, source: String) -> Result<DataFrame, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    task::spawn_blocking(move || match extension.as_deref() {
        Some("csv") => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path))
            .and_then(|reader| reader.finish())
            .map_err(|e| LoadError::Parse(source, e)),
        Some("parquet") => {
            let file =
                std::fs::File::open(&path).map_err(|e| LoadError::Io(source.clone(), e))?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| LoadError::Parse(source, e))
        }
        _ => Err(LoadError::UnsupportedFormat(source)),
    })
    .await?
}

/// Converts a loaded frame into event records using the given column mapping.
///
/// The label column is cast to text, the other three to floats; the timestamp
/// goes through numeric normalization row by row.
pub fn events_from_dataframe(
    df: &DataFrame,
    columns: &EventColumns,
) -> Result<Vec<WildfireEvent>, LoadError> {
    let labels = string_column(df, &columns.label)?;
    let timestamps = float_column(df, &columns.timestamp)?;
    let latitudes = float_column(df, &columns.latitude)?;
    let longitudes = float_column(df, &columns.longitude)?;

    Ok((0..df.height())
        .map(|i| WildfireEvent {
            label: labels[i].clone().unwrap_or_default(),
            ignition_datetime: timestamps[i].and_then(parse_numeric_timestamp),
            latitude: latitudes[i],
            longitude: longitudes[i],
        })
        .collect())
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoadError> {
    let column = df
        .column(name)
        .map_err(|e| LoadError::ColumnNotFound(name.to_string(), e))?;
    let casted = column
        .cast(&DataType::String)
        .map_err(|e| LoadError::Parse(name.to_string(), e))?;
    let values = casted
        .str()
        .map_err(|e| LoadError::Parse(name.to_string(), e))?;
    Ok(values.into_iter().map(|v| v.map(String::from)).collect())
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoadError> {
    let column = df
        .column(name)
        .map_err(|e| LoadError::ColumnNotFound(name.to_string(), e))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| LoadError::Parse(name.to_string(), e))?;
    let values = casted
        .f64()
        .map_err(|e| LoadError::Parse(name.to_string(), e))?;
    Ok(values.into_iter().collect())
}
