//! Per-row enrichment: one event in, one observation out, no exceptions.

use crate::archive::{ArchiveError, RasterArchive, Resampling, SampleRequest};
use crate::retry::RetryPolicy;
use crate::types::event::WildfireEvent;
use crate::types::observation::WeatherObservation;
use crate::types::wind::{CardinalDirection, WindVector};
use chrono::Duration;
use log::{error, warn};
use std::collections::HashMap;

/// ERA5-Land bands read for every sampled point.
pub const SAMPLE_VARIABLES: [&str; 5] = [
    "temperature_2m",
    "u_component_of_wind_10m",
    "v_component_of_wind_10m",
    "dewpoint_temperature_2m",
    "soil_temperature_level_1",
];

const KELVIN_OFFSET: f64 = 273.15;

/// Samples the weather archive at one event's time and place.
///
/// The sampler never fails: any row-level problem (missing timestamp or
/// coordinates, an empty query window, an archive error that survives the
/// retry policy) degrades that row to [`WeatherObservation::no_data`] and is
/// logged, so a single bad row can never take its batch down.
pub struct PointSampler<A: RasterArchive> {
    archive: A,
    collection: String,
    retry: RetryPolicy,
}

impl<A: RasterArchive> PointSampler<A> {
    pub fn new(archive: A, collection: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            archive,
            collection: collection.into(),
            retry,
        }
    }

    /// Enriches a single event.
    ///
    /// Queries the window `[t - 1h, t + 2h)` around the ignition timestamp and
    /// samples the first matching image bilinearly at the event's coordinate.
    pub async fn observe(&self, event: &WildfireEvent) -> WeatherObservation {
        let Some(datetime) = event.ignition_datetime else {
            warn!(
                "Fire label {} has no usable ignition timestamp",
                event.label
            );
            return WeatherObservation::no_data(event);
        };
        let (Some(latitude), Some(longitude)) = (event.latitude, event.longitude) else {
            warn!(
                "Fire label {} has invalid coordinates: lat={:?}, lon={:?}",
                event.label, event.latitude, event.longitude
            );
            return WeatherObservation::no_data(event);
        };

        let request = SampleRequest {
            collection: self.collection.clone(),
            start: datetime - Duration::hours(1),
            end: datetime + Duration::hours(2),
            latitude,
            longitude,
            variables: SAMPLE_VARIABLES.iter().map(|v| v.to_string()).collect(),
            resampling: Resampling::Bilinear,
        };

        let sampled = self
            .retry
            .run(
                || self.archive.sample_point(&request),
                ArchiveError::is_transient,
            )
            .await;

        match sampled {
            Ok(Some(values)) if !values.is_empty() => Self::decode(event, &values),
            Ok(_) => {
                warn!(
                    "No data returned for ({latitude}, {longitude}) at {datetime} for fire label {}",
                    event.label
                );
                WeatherObservation::no_data(event)
            }
            Err(e) => {
                error!(
                    "Sampling failed for ({latitude}, {longitude}) at {datetime} for fire label {}: {e}",
                    event.label
                );
                WeatherObservation::no_data(event)
            }
        }
    }

    /// Turns a raw band map into an observation.
    ///
    /// Missing wind components default to 0, so wind fields are always
    /// populated for a non-empty sample; a missing temperature stays unset.
    fn decode(event: &WildfireEvent, values: &HashMap<String, f64>) -> WeatherObservation {
        let wind = WindVector::new(
            values.get("u_component_of_wind_10m").copied().unwrap_or(0.0),
            values.get("v_component_of_wind_10m").copied().unwrap_or(0.0),
        );
        let direction_deg = wind.direction_deg();
        let direction_text = CardinalDirection::from_degrees(direction_deg)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        WeatherObservation {
            temperature_c: values.get("temperature_2m").map(|k| k - KELVIN_OFFSET),
            wind_speed_ms: Some(wind.speed()),
            wind_direction_deg: Some(direction_deg),
            wind_direction: direction_text,
            dewpoint_temperature_2m: values.get("dewpoint_temperature_2m").copied(),
            soil_temperature_level_1: values.get("soil_temperature_level_1").copied(),
            fire_label: event.label.clone(),
            ignition_datetime: event.ignition_datetime,
        }
    }
}
