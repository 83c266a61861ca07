//! Typed error enum for the geo crate.

use thiserror::Error;

/// Errors from country coordinate lookups.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code} for {country_code}")]
    HttpStatus { code: u16, country_code: String },
    #[error("JSON parse error for {country_code}: {source}")]
    JsonParse {
        country_code: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no coordinates in response for {0}")]
    MissingCoordinates(String),
    #[error("invalid country code: {0:?}")]
    InvalidCountryCode(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl GeoError {
    /// Whether this error is transient. Lookups are never retried; callers
    /// use this only to pick a log level.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}
