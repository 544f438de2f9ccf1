//! Batch enrichment of wildfire ignition events with point-in-time weather
//! observations from the ERA5-Land hourly raster archive.
//!
//! For every event (label, ignition timestamp, coordinate) the pipeline finds
//! the raster covering the window around the ignition moment, samples it
//! bilinearly at the event's position, derives wind speed and direction from
//! the u/v components, and writes the enriched rows out batch by batch so
//! that an interrupted run never loses completed work.
//!
//! Row-level problems (malformed timestamps, missing coordinates, empty query
//! windows, remote failures) degrade individual rows to a null observation;
//! batches with no usable data are skipped; the run as a whole only fails
//! when a checkpoint cannot be written.
//!
//! ```no_run
//! use fireweather::{EventLoader, FireWeather};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let events = EventLoader::new()
//!     .load_events()
//!     .source("data/bc_wildfires.csv")
//!     .call()
//!     .await?;
//!
//! let client = FireWeather::new()?;
//! let result = client.enrich(events).await?;
//! if let Some(observations) = result.observations() {
//!     client.save_combined(observations).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod archive;
mod config;
mod error;
mod fireweather;
mod loader;
mod pipeline;
mod retry;
mod sampling;
mod timestamp;
mod types;
mod utils;

pub use error::FireWeatherError;
pub use fireweather::*;

pub use archive::{ArchiveError, Era5LandArchive, RasterArchive, Resampling, SampleRequest};
pub use config::EnrichmentConfig;
pub use loader::{events_from_dataframe, EventColumns, EventLoader, LoadError};
pub use pipeline::orchestrator::{BatchOrchestrator, EnrichmentResult};
pub use pipeline::sink::{observations_to_dataframe, CsvCheckpointSink, ResultSink, SinkError};
pub use retry::RetryPolicy;
pub use sampling::{PointSampler, SAMPLE_VARIABLES};
pub use timestamp::{normalize_timestamps, parse_numeric_timestamp};
pub use types::event::WildfireEvent;
pub use types::observation::{WeatherObservation, NO_DATA_DIRECTION};
pub use types::wind::{CardinalDirection, WindVector};
