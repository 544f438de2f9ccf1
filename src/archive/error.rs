use thiserror::Error;

/// Errors raised by a remote raster archive.
///
/// Timeouts and quota exhaustion are transient: the same request is expected
/// to succeed on retry once the service recovers. Everything else is treated
/// as permanent for the purposes of the retry policy.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Request to weather archive timed out for {0}")]
    Timeout(String),

    #[error("Weather archive request quota exhausted for {0}")]
    QuotaExhausted(String),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed response from weather archive at {0}")]
    MalformedResponse(String, #[source] serde_json::Error),
}

impl ArchiveError {
    /// Whether backing off and retrying the request can reasonably help.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ArchiveError::Timeout(_) | ArchiveError::QuotaExhausted(_)
        )
    }
}
