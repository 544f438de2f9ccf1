//! The remote weather archive boundary.
//!
//! The pipeline talks to the archive exclusively through [`RasterArchive`]:
//! one request describing a time window, a point and a variable list; zero or
//! one raster samples back. [`Era5LandArchive`] is the HTTP implementation;
//! tests substitute scripted doubles.

mod era5;
mod error;

pub use era5::Era5LandArchive;
pub use error::ArchiveError;

use chrono::NaiveDateTime;
use std::collections::HashMap;

/// How a raster is interpolated at the sampled point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    Bilinear,
    Nearest,
}

impl Resampling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resampling::Bilinear => "bilinear",
            Resampling::Nearest => "nearest",
        }
    }
}

/// One point-sampling query against a raster collection.
///
/// The window is half-open, `[start, end)`. When several images fall inside
/// the window the archive samples the *first one in the collection's intrinsic
/// ordering*; there is intentionally no nearest-in-time ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRequest {
    /// Collection identifier, e.g. `ECMWF/ERA5_LAND/HOURLY`.
    pub collection: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    /// Band names to read out of the selected image.
    pub variables: Vec<String>,
    pub resampling: Resampling,
}

/// A remote, quota-limited gridded weather archive.
///
/// Returns `Ok(None)` when no image in the collection covers the requested
/// window, and `Ok(Some(values))` with a band-name-to-value mapping otherwise.
/// Bands missing from the selected image are simply absent from the map.
pub trait RasterArchive {
    fn sample_point(
        &self,
        request: &SampleRequest,
    ) -> impl std::future::Future<Output = Result<Option<HashMap<String, f64>>, ArchiveError>> + Send;
}
