//! The main entry point for enriching wildfire events with weather data.

use crate::archive::{Era5LandArchive, RasterArchive};
use crate::config::EnrichmentConfig;
use crate::error::FireWeatherError;
use crate::pipeline::orchestrator::{BatchOrchestrator, EnrichmentResult};
use crate::pipeline::sink::CsvCheckpointSink;
use crate::sampling::PointSampler;
use crate::types::event::WildfireEvent;
use crate::types::observation::WeatherObservation;
use crate::utils::default_checkpoint_dir;
use std::path::PathBuf;

/// Collection identifier of the hourly ERA5-Land reanalysis rasters.
pub const ERA5_LAND_HOURLY: &str = "ECMWF/ERA5_LAND/HOURLY";

/// Filename of the combined, concatenated output table.
pub const COMBINED_FILENAME: &str = "weather_data.csv";

/// The client struct for batch-enriching wildfire events.
///
/// Owns a [`PointSampler`] over a raster archive, a [`CsvCheckpointSink`] for
/// per-batch durability, and the run configuration. The default wiring talks
/// to the ERA5-Land hourly collection and checkpoints into
/// `<downloads>/temp_downloads`; tests and alternative deployments can inject
/// any [`RasterArchive`] implementation via [`FireWeather::with_archive`].
///
/// # Examples
///
/// ```no_run
/// # use fireweather::{FireWeather, EventLoader, FireWeatherError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let loader = EventLoader::new();
/// let events = loader
///     .load_events()
///     .source("data/bc_wildfires.csv")
///     .call()
///     .await?;
///
/// let client = FireWeather::new()?;
/// let result = client.enrich(events).await?;
/// if let Some(observations) = result.observations() {
///     client.save_combined(observations).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct FireWeather<A: RasterArchive = Era5LandArchive> {
    sampler: PointSampler<A>,
    sink: CsvCheckpointSink,
    config: EnrichmentConfig,
}

impl FireWeather<Era5LandArchive> {
    /// Creates a client with the default archive, configuration and
    /// checkpoint folder.
    ///
    /// # Errors
    ///
    /// Returns [`FireWeatherError::CheckpointDirResolution`] when no downloads
    /// or home directory can be determined for the default checkpoint folder.
    pub fn new() -> Result<Self, FireWeatherError> {
        let folder = default_checkpoint_dir().map_err(FireWeatherError::CheckpointDirResolution)?;
        Ok(Self::with_checkpoint_folder(folder))
    }

    /// Creates a client with the default archive, checkpointing into `folder`.
    pub fn with_checkpoint_folder(folder: PathBuf) -> Self {
        Self::with_archive(
            Era5LandArchive::default(),
            folder,
            EnrichmentConfig::default(),
        )
    }
}

impl<A: RasterArchive> FireWeather<A> {
    /// Creates a fully custom client: any archive implementation, any
    /// checkpoint folder, any configuration.
    pub fn with_archive(archive: A, checkpoint_folder: PathBuf, config: EnrichmentConfig) -> Self {
        Self {
            sampler: PointSampler::new(archive, ERA5_LAND_HOURLY, config.retry),
            sink: CsvCheckpointSink::new(checkpoint_folder),
            config,
        }
    }

    /// Runs the batch-enrichment pipeline over `events`.
    ///
    /// Events with unknown timestamps are dropped up front; the rest are
    /// sorted, partitioned into batches, sampled row by row and checkpointed
    /// batch by batch. See [`BatchOrchestrator`] for the failure policy.
    ///
    /// # Errors
    ///
    /// Only a checkpoint-write failure surfaces here; row and batch failures
    /// are absorbed into the [`EnrichmentResult`].
    pub async fn enrich(
        &self,
        events: Vec<WildfireEvent>,
    ) -> Result<EnrichmentResult, FireWeatherError> {
        let orchestrator = BatchOrchestrator::new(&self.sampler, &self.sink, &self.config);
        orchestrator.run(events).await.map_err(FireWeatherError::from)
    }

    /// Writes the combined observation table to `weather_data.csv` in the
    /// checkpoint folder and returns the path written.
    pub async fn save_combined(
        &self,
        observations: &[WeatherObservation],
    ) -> Result<PathBuf, FireWeatherError> {
        self.sink
            .write_csv(COMBINED_FILENAME, observations)
            .await
            .map_err(FireWeatherError::from)
    }
}
