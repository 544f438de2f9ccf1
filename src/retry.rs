//! Bounded exponential backoff around a single fallible remote call.

use bon::bon;
use log::warn;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry policy for transient remote failures.
///
/// The policy wraps one async operation and retries it only when the supplied
/// classifier marks the error as transient (a timeout or quota error on the
/// remote service). Each retry waits `initial_delay * backoff_factor^n` plus a
/// random jitter in `[0, 0.1 * delay)`; the jitter keeps repeated calls from
/// retrying in lockstep. Non-transient errors propagate immediately, since
/// backing off cannot fix them.
///
/// # Examples
///
/// ```
/// use fireweather::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::builder()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(500))
///     .build();
/// assert_eq!(policy.max_retries, 5);
///
/// // Defaults: 3 retries, 2s initial delay, factor 2.
/// let default_policy = RetryPolicy::default();
/// assert_eq!(default_policy.max_retries, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[bon]
impl RetryPolicy {
    #[builder]
    pub fn new(
        max_retries: Option<u32>,
        initial_delay: Option<Duration>,
        backoff_factor: Option<f64>,
    ) -> Self {
        Self {
            max_retries: max_retries.unwrap_or(3),
            initial_delay: initial_delay.unwrap_or(Duration::from_secs(2)),
            backoff_factor: backoff_factor.unwrap_or(2.0),
        }
    }

    /// Runs `op`, retrying transient failures with exponential backoff.
    ///
    /// `op` is invoked once per attempt; `is_transient` decides whether an
    /// error is worth retrying. After `max_retries` retries the last error
    /// propagates unchanged. Retry state lives only for the duration of this
    /// call.
    pub async fn run<T, E, Op, Fut, C>(&self, mut op: Op, is_transient: C) -> Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
        E: Display,
    {
        let mut retries = 0u32;
        let mut delay = self.initial_delay;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if is_transient(&error) && retries < self.max_retries => {
                    let jitter = delay.mul_f64(rand::rng().random_range(0.0..0.1));
                    let pause = delay + jitter;
                    warn!(
                        "Transient error ({}), retrying in {:.1} seconds (attempt {}/{})",
                        error,
                        pause.as_secs_f64(),
                        retries + 1,
                        self.max_retries
                    );
                    sleep(pause).await;
                    delay = delay.mul_f64(self.backoff_factor);
                    retries += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
