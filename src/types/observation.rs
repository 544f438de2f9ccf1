use crate::types::event::WildfireEvent;
use chrono::NaiveDateTime;

/// Sentinel text used for the wind direction of an observation that carries no data.
pub const NO_DATA_DIRECTION: &str = "No data returned";

/// A point-in-time weather readout for one wildfire event.
///
/// Every numeric field is optional; an observation where the remote archive
/// returned nothing has all of them unset and
/// `wind_direction == "No data returned"` (see [`WeatherObservation::no_data`]).
/// Exactly one observation is produced per input event and it is never revised
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// 2 m air temperature in degrees Celsius (converted from Kelvin).
    pub temperature_c: Option<f64>,
    /// 10 m wind speed in m/s, derived from the u/v components.
    pub wind_speed_ms: Option<f64>,
    /// Meteorological wind bearing in degrees, `[0, 360)`.
    pub wind_direction_deg: Option<f64>,
    /// 8-point compass label for the bearing, or a sentinel when absent.
    pub wind_direction: String,
    /// 2 m dewpoint temperature in Kelvin, as delivered by the archive.
    pub dewpoint_temperature_2m: Option<f64>,
    /// Topmost soil layer temperature in Kelvin, as delivered by the archive.
    pub soil_temperature_level_1: Option<f64>,
    /// Back-reference to the event this observation belongs to.
    pub fire_label: String,
    pub ignition_datetime: Option<NaiveDateTime>,
}

impl WeatherObservation {
    /// The default observation for an event that could not be enriched.
    pub fn no_data(event: &WildfireEvent) -> Self {
        Self {
            temperature_c: None,
            wind_speed_ms: None,
            wind_direction_deg: None,
            wind_direction: NO_DATA_DIRECTION.to_string(),
            dewpoint_temperature_2m: None,
            soil_temperature_level_1: None,
            fire_label: event.label.clone(),
            ignition_datetime: event.ignition_datetime,
        }
    }

    /// Whether this row contributes usable data to its batch.
    ///
    /// A batch where no observation has a temperature is classified as failed
    /// and dropped from the output.
    pub fn has_temperature(&self) -> bool {
        self.temperature_c.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn no_data_observation_keeps_the_back_reference() {
        let dt = NaiveDate::from_ymd_opt(2021, 7, 1)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let event = WildfireEvent::new("G80321", Some(dt), Some(53.9), Some(-122.7));

        let obs = WeatherObservation::no_data(&event);

        assert_eq!(obs.fire_label, "G80321");
        assert_eq!(obs.ignition_datetime, Some(dt));
        assert_eq!(obs.wind_direction, NO_DATA_DIRECTION);
        assert!(obs.temperature_c.is_none());
        assert!(obs.wind_speed_ms.is_none());
        assert!(obs.wind_direction_deg.is_none());
        assert!(obs.dewpoint_temperature_2m.is_none());
        assert!(obs.soil_temperature_level_1.is_none());
        assert!(!obs.has_temperature());
    }
}
