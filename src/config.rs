use crate::retry::RetryPolicy;
use bon::bon;
use std::time::Duration;

/// Settings for one enrichment run.
///
/// The defaults mirror a conservative posture towards the archive's request
/// quota: small batches, a pause between them, and a retry policy that backs
/// off on transient failures.
///
/// # Examples
///
/// ```
/// use fireweather::EnrichmentConfig;
/// use std::time::Duration;
///
/// let config = EnrichmentConfig::builder()
///     .batch_size(100)
///     .inter_batch_delay(Duration::from_secs(1))
///     .build();
/// assert_eq!(config.batch_size, 100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentConfig {
    /// Number of events enriched per batch. Default 50.
    pub batch_size: usize,
    /// Pause between consecutive batches (not applied after the last one).
    /// Default 3 seconds.
    pub inter_batch_delay: Duration,
    /// Backoff policy for transient archive failures.
    pub retry: RetryPolicy,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[bon]
impl EnrichmentConfig {
    #[builder]
    pub fn new(
        batch_size: Option<usize>,
        inter_batch_delay: Option<Duration>,
        retry: Option<RetryPolicy>,
    ) -> Self {
        Self {
            batch_size: batch_size.unwrap_or(50).max(1),
            inter_batch_delay: inter_batch_delay.unwrap_or(Duration::from_secs(3)),
            retry: retry.unwrap_or_default(),
        }
    }
}
