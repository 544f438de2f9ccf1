use crate::archive::error::ArchiveError;
use crate::archive::{RasterArchive, SampleRequest};
use bon::bon;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://earthengine.googleapis.com/v1";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Serialize)]
struct SampleBody<'a> {
    collection: &'a str,
    start: String,
    end: String,
    /// `[longitude, latitude]`, GeoJSON axis order.
    point: [f64; 2],
    bands: &'a [String],
    resampling: &'a str,
}

#[derive(Debug, Deserialize)]
struct SampleResponse {
    #[serde(default)]
    samples: Vec<SampleRow>,
}

#[derive(Debug, Deserialize)]
struct SampleRow {
    #[serde(default)]
    properties: HashMap<String, Option<f64>>,
}

/// HTTP client for a point-sampling endpoint over the ERA5-Land raster archive.
///
/// Sends one JSON request per sample and maps the service's failure modes onto
/// [`ArchiveError`]: request timeouts become [`ArchiveError::Timeout`] and
/// HTTP 429 becomes [`ArchiveError::QuotaExhausted`], which are the two
/// transient classes the retry policy acts on. Credential acquisition is out
/// of scope; pass an already-valid bearer token if the service requires one.
///
/// # Examples
///
/// ```
/// use fireweather::Era5LandArchive;
/// use std::time::Duration;
///
/// let archive = Era5LandArchive::builder()
///     .base_url("https://weather.internal/v1")
///     .request_timeout(Duration::from_secs(10))
///     .build();
/// ```
pub struct Era5LandArchive {
    base_url: String,
    auth_token: Option<String>,
    request_timeout: Duration,
    client: Client,
}

#[bon]
impl Era5LandArchive {
    #[builder]
    pub fn new(
        #[builder(into)] base_url: Option<String>,
        #[builder(into)] auth_token: Option<String>,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            auth_token,
            request_timeout: request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            client: Client::new(),
        }
    }

    fn sample_url(&self) -> String {
        format!("{}/sample", self.base_url.trim_end_matches('/'))
    }

    fn body_for(request: &SampleRequest) -> SampleBody<'_> {
        SampleBody {
            collection: &request.collection,
            start: request.start.format(TIME_FORMAT).to_string(),
            end: request.end.format(TIME_FORMAT).to_string(),
            point: [request.longitude, request.latitude],
            bands: &request.variables,
            resampling: request.resampling.as_str(),
        }
    }
}

impl Default for Era5LandArchive {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RasterArchive for Era5LandArchive {
    async fn sample_point(
        &self,
        request: &SampleRequest,
    ) -> Result<Option<HashMap<String, f64>>, ArchiveError> {
        let url = self.sample_url();
        let body = Self::body_for(request);

        let mut http_request = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&body);
        if let Some(token) = &self.auth_token {
            http_request = http_request.bearer_auth(token);
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                ArchiveError::Timeout(url.clone())
            } else {
                ArchiveError::NetworkRequest(url.clone(), e)
            }
        })?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("Quota exhausted for {url}");
            return Err(ArchiveError::QuotaExhausted(url));
        }

        let response = response.error_for_status().map_err(|e| {
            warn!("HTTP error for {url}: {e:?}");
            if let Some(status) = e.status() {
                ArchiveError::HttpStatus {
                    url: url.clone(),
                    status,
                    source: e,
                }
            } else {
                ArchiveError::NetworkRequest(url.clone(), e)
            }
        })?;

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ArchiveError::Timeout(url.clone())
            } else {
                ArchiveError::NetworkRequest(url.clone(), e)
            }
        })?;

        let parsed: SampleResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ArchiveError::MalformedResponse(url.clone(), e))?;

        // First image in collection order; later matches are ignored.
        let Some(row) = parsed.samples.into_iter().next() else {
            info!(
                "No image in {} covers [{}, {})",
                request.collection, body.start, body.end
            );
            return Ok(None);
        };

        let values: HashMap<String, f64> = row
            .properties
            .into_iter()
            .filter_map(|(band, value)| value.map(|v| (band, v)))
            .collect();

        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Resampling;
    use chrono::NaiveDate;

    fn request() -> SampleRequest {
        let t = NaiveDate::from_ymd_opt(2021, 7, 4)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        SampleRequest {
            collection: "ECMWF/ERA5_LAND/HOURLY".to_string(),
            start: t - chrono::Duration::hours(1),
            end: t + chrono::Duration::hours(2),
            latitude: 53.9,
            longitude: -122.7,
            variables: vec!["temperature_2m".to_string()],
            resampling: Resampling::Bilinear,
        }
    }

    #[test]
    fn body_uses_geojson_axis_order_and_iso_times() {
        let request = request();
        let body = Era5LandArchive::body_for(&request);

        assert_eq!(body.point, [-122.7, 53.9]);
        assert_eq!(body.start, "2021-07-04T14:00:00");
        assert_eq!(body.end, "2021-07-04T17:00:00");
        assert_eq!(body.resampling, "bilinear");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["collection"], "ECMWF/ERA5_LAND/HOURLY");
        assert_eq!(json["bands"][0], "temperature_2m");
    }

    #[test]
    fn nearest_resampling_is_encoded_on_the_wire() {
        let mut request = request();
        request.resampling = Resampling::Nearest;
        let body = Era5LandArchive::body_for(&request);

        assert_eq!(body.resampling, "nearest");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["resampling"], "nearest");
    }

    #[test]
    fn sample_url_tolerates_trailing_slash() {
        let archive = Era5LandArchive::builder()
            .base_url("https://weather.internal/v1/")
            .build();
        assert_eq!(archive.sample_url(), "https://weather.internal/v1/sample");
    }

    #[test]
    fn response_rows_drop_null_bands() {
        let parsed: SampleResponse = serde_json::from_str(
            r#"{"samples":[{"properties":{"temperature_2m":287.4,"u_component_of_wind_10m":null}}]}"#,
        )
        .unwrap();
        let row = parsed.samples.into_iter().next().unwrap();
        let values: HashMap<String, f64> = row
            .properties
            .into_iter()
            .filter_map(|(band, value)| value.map(|v| (band, v)))
            .collect();

        assert_eq!(values.len(), 1);
        assert_eq!(values["temperature_2m"], 287.4);
    }

    #[test]
    fn empty_sample_list_deserializes() {
        let parsed: SampleResponse = serde_json::from_str(r#"{"samples":[]}"#).unwrap();
        assert!(parsed.samples.is_empty());
        let parsed: SampleResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(parsed.samples.is_empty());
    }
}
