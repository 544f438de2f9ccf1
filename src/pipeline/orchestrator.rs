//! The batch-enrichment driver: sort, partition, sample, checkpoint, pace.

use crate::archive::RasterArchive;
use crate::config::EnrichmentConfig;
use crate::pipeline::sink::{ResultSink, SinkError};
use crate::sampling::PointSampler;
use crate::types::event::WildfireEvent;
use crate::types::observation::WeatherObservation;
use log::{info, warn};
use tokio::time::sleep;

/// Outcome of an enrichment run.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentResult {
    /// The concatenation of all succeeded batches, in batch (= timestamp) order.
    Enriched(Vec<WeatherObservation>),
    /// Every batch failed; the normalized (filtered and sorted) input is handed
    /// back unchanged so the caller can tell nothing was lost, just not enriched.
    Unenriched(Vec<WildfireEvent>),
}

impl EnrichmentResult {
    pub fn is_enriched(&self) -> bool {
        matches!(self, EnrichmentResult::Enriched(_))
    }

    pub fn observations(&self) -> Option<&[WeatherObservation]> {
        match self {
            EnrichmentResult::Enriched(observations) => Some(observations),
            EnrichmentResult::Unenriched(_) => None,
        }
    }
}

/// Drives end-to-end enrichment over a full event set.
///
/// Execution is strictly sequential: one batch at a time, one row at a time.
/// Row failures degrade to the default observation inside the sampler; a batch
/// with no usable temperature at all is skipped (no checkpoint, no output
/// rows) and the run continues. Only a checkpoint-write failure aborts.
pub struct BatchOrchestrator<'a, A: RasterArchive, S: ResultSink> {
    sampler: &'a PointSampler<A>,
    sink: &'a S,
    config: &'a EnrichmentConfig,
}

impl<'a, A: RasterArchive, S: ResultSink> BatchOrchestrator<'a, A, S> {
    pub fn new(sampler: &'a PointSampler<A>, sink: &'a S, config: &'a EnrichmentConfig) -> Self {
        Self {
            sampler,
            sink,
            config,
        }
    }

    /// Runs the pipeline over `events`.
    ///
    /// Events with an unknown timestamp are excluded up front; the rest are
    /// processed in ascending ignition-timestamp order.
    pub async fn run(&self, events: Vec<WildfireEvent>) -> Result<EnrichmentResult, SinkError> {
        let mut events: Vec<WildfireEvent> = events
            .into_iter()
            .filter(|e| e.ignition_datetime.is_some())
            .collect();
        events.sort_by_key(|e| e.ignition_datetime);

        let batch_size = self.config.batch_size.max(1);
        let total_batches = events.len().div_ceil(batch_size);
        let mut results: Vec<WeatherObservation> = Vec::new();

        for (index, batch) in events.chunks(batch_size).enumerate() {
            let batch_num = index + 1;
            info!(
                "Processing batch {batch_num} of {total_batches} ({} rows)",
                batch.len()
            );

            let mut observations = Vec::with_capacity(batch.len());
            for event in batch {
                observations.push(self.sampler.observe(event).await);
            }

            if observations.iter().all(|o| !o.has_temperature()) {
                warn!(
                    "Skipping batch {batch_num} of {total_batches}: no temperature data available"
                );
            } else {
                self.sink
                    .persist_batch(batch_num, total_batches, &observations)
                    .await?;
                info!(
                    "Completed batch {batch_num}/{total_batches} ({:.1}%)",
                    batch_num as f64 / total_batches as f64 * 100.0
                );
                results.extend(observations);
            }

            if batch_num < total_batches {
                info!(
                    "Pausing for {:.1} second(s) before next batch",
                    self.config.inter_batch_delay.as_secs_f64()
                );
                sleep(self.config.inter_batch_delay).await;
            }
        }

        if results.is_empty() {
            warn!("No weather data could be retrieved for any batch");
            Ok(EnrichmentResult::Unenriched(events))
        } else {
            info!("Weather data processing complete: {} rows", results.len());
            Ok(EnrichmentResult::Enriched(results))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveError, SampleRequest};
    use crate::retry::RetryPolicy;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Archive double: rows whose latitude falls in `gap` get no data.
    struct GappyArchive {
        gap: std::ops::Range<f64>,
    }

    impl RasterArchive for GappyArchive {
        async fn sample_point(
            &self,
            request: &SampleRequest,
        ) -> Result<Option<HashMap<String, f64>>, ArchiveError> {
            if self.gap.contains(&request.latitude) {
                Ok(None)
            } else {
                Ok(Some(HashMap::from([
                    ("temperature_2m".to_string(), 290.15),
                    ("u_component_of_wind_10m".to_string(), 3.0),
                    ("v_component_of_wind_10m".to_string(), 4.0),
                ])))
            }
        }
    }

    /// Sink double that records which batches were persisted.
    #[derive(Default)]
    struct RecordingSink {
        persisted: Mutex<Vec<(usize, usize, usize)>>,
    }

    impl ResultSink for RecordingSink {
        async fn persist_batch(
            &self,
            batch_num: usize,
            total_batches: usize,
            observations: &[WeatherObservation],
        ) -> Result<(), SinkError> {
            self.persisted
                .lock()
                .unwrap()
                .push((batch_num, total_batches, observations.len()));
            Ok(())
        }
    }

    fn events(count: usize) -> Vec<WildfireEvent> {
        let base = NaiveDate::from_ymd_opt(2021, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..count)
            .map(|i| {
                WildfireEvent::new(
                    format!("F{i:04}"),
                    Some(base + ChronoDuration::hours(i as i64)),
                    Some(i as f64),
                    Some(-120.0),
                )
            })
            .collect()
    }

    fn config(batch_size: usize) -> EnrichmentConfig {
        EnrichmentConfig::builder()
            .batch_size(batch_size)
            .inter_batch_delay(Duration::ZERO)
            .retry(
                RetryPolicy::builder()
                    .initial_delay(Duration::from_millis(1))
                    .build(),
            )
            .build()
    }

    fn sampler(gap: std::ops::Range<f64>, config: &EnrichmentConfig) -> PointSampler<GappyArchive> {
        PointSampler::new(GappyArchive { gap }, "ECMWF/ERA5_LAND/HOURLY", config.retry)
    }

    #[tokio::test]
    async fn a_failed_middle_batch_is_skipped_and_the_rest_survive() {
        let config = config(50);
        // 120 events in 3 batches of 50/50/20; rows 50..100 (batch 2) get no data.
        let sampler = sampler(50.0..100.0, &config);
        let sink = RecordingSink::default();
        let orchestrator = BatchOrchestrator::new(&sampler, &sink, &config);

        let result = orchestrator.run(events(120)).await.unwrap();

        let observations = result.observations().expect("run should enrich");
        assert_eq!(observations.len(), 70);

        let persisted = sink.persisted.lock().unwrap();
        assert_eq!(persisted.as_slice(), &[(1, 3, 50), (3, 3, 20)]);
    }

    #[tokio::test]
    async fn output_is_in_ascending_timestamp_order() {
        let config = config(25);
        let sampler = sampler(f64::NAN..f64::NAN, &config);
        let sink = RecordingSink::default();
        let orchestrator = BatchOrchestrator::new(&sampler, &sink, &config);

        // Feed the events in reverse to prove the sort.
        let mut input = events(60);
        input.reverse();
        let result = orchestrator.run(input).await.unwrap();

        let observations = result.observations().unwrap();
        assert_eq!(observations.len(), 60);
        for pair in observations.windows(2) {
            assert!(pair[0].ignition_datetime <= pair[1].ignition_datetime);
        }
    }

    #[tokio::test]
    async fn unknown_timestamps_are_excluded_before_batching() {
        let config = config(10);
        let sampler = sampler(f64::NAN..f64::NAN, &config);
        let sink = RecordingSink::default();
        let orchestrator = BatchOrchestrator::new(&sampler, &sink, &config);

        let mut input = events(9);
        input.push(WildfireEvent::new("BAD", None, Some(1.0), Some(-120.0)));
        let result = orchestrator.run(input).await.unwrap();

        // 9 usable events fit one batch; the unknown-timestamp row is gone.
        assert_eq!(result.observations().unwrap().len(), 9);
        assert_eq!(sink.persisted.lock().unwrap().as_slice(), &[(1, 1, 9)]);
    }

    #[tokio::test]
    async fn total_failure_returns_the_normalized_input() {
        let config = config(10);
        // Every latitude falls in the gap.
        let sampler = sampler(f64::NEG_INFINITY..f64::INFINITY, &config);
        let sink = RecordingSink::default();
        let orchestrator = BatchOrchestrator::new(&sampler, &sink, &config);

        let result = orchestrator.run(events(20)).await.unwrap();

        assert!(!result.is_enriched());
        let EnrichmentResult::Unenriched(remaining) = result else {
            panic!("expected Unenriched");
        };
        assert_eq!(remaining.len(), 20);
        assert!(sink.persisted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn an_empty_event_set_is_total_failure_with_nothing_to_return() {
        let config = config(10);
        let sampler = sampler(f64::NAN..f64::NAN, &config);
        let sink = RecordingSink::default();
        let orchestrator = BatchOrchestrator::new(&sampler, &sink, &config);

        let result = orchestrator.run(Vec::new()).await.unwrap();

        assert_eq!(result, EnrichmentResult::Unenriched(Vec::new()));
    }
}
