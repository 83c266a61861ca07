//! Country coordinate lookup for regdesk.
//!
//! The map view places one marker per candidate at their country's
//! coordinates. Lookups go through [`CountryLocator`] so callers can swap the
//! HTTP client for a fixed table in tests.

mod client;
mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::GeoClient;
pub use error::GeoError;

/// Latitude / longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components finite and inside their valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Resolves an ISO alpha-2 country code to coordinates.
#[async_trait]
pub trait CountryLocator: Send + Sync {
    async fn locate(&self, country_code: &str) -> Result<Coordinates, GeoError>;
}
