use chrono::NaiveDateTime;

/// A single wildfire ignition record, as produced by the tabular loader.
///
/// Events are read-only inputs to the enrichment pipeline. The timestamp and
/// coordinates are optional because source tables routinely contain rows with
/// malformed dates or missing positions; such rows degrade gracefully instead
/// of aborting a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct WildfireEvent {
    /// Opaque identifier of the fire, carried through to the output unchanged.
    pub label: String,
    /// Normalized ignition timestamp, `None` when the source value was absent
    /// or could not be interpreted.
    pub ignition_datetime: Option<NaiveDateTime>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl WildfireEvent {
    pub fn new(
        label: impl Into<String>,
        ignition_datetime: Option<NaiveDateTime>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            label: label.into(),
            ignition_datetime,
            latitude,
            longitude,
        }
    }

    /// Whether the event carries everything the sampler needs for a remote query.
    pub fn is_sampleable(&self) -> bool {
        self.ignition_datetime.is_some() && self.latitude.is_some() && self.longitude.is_some()
    }
}
