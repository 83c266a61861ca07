use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::GeoError;
use crate::{Coordinates, CountryLocator};

/// Request timeout for a single lookup.
pub const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the country-info endpoint.
///
/// `GET {base_url}{CODE}.json` returns an object (sometimes wrapped in a
/// JSON string) with the coordinates at `Results.GeoPt` as `[lat, lon]`.
/// Successful lookups are cached per country code; failures are not.
#[derive(Debug)]
pub struct GeoClient {
    client: reqwest::Client,
    base_url: String,
    cache: RwLock<HashMap<String, Coordinates>>,
}

impl GeoClient {
    /// Creates a client for the endpoint rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeoError> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()
            .map_err(|e| GeoError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url, cache: RwLock::new(HashMap::new()) })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of cached country codes.
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }

    async fn fetch(&self, code: &str) -> Result<Coordinates, GeoError> {
        let url = format!("{}{code}.json", self.base_url);
        tracing::debug!(%url, "Fetching country coordinates");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::HttpStatus {
                code: status.as_u16(),
                country_code: code.to_owned(),
            });
        }
        let body = response.text().await?;
        parse_geo_point(code, &body)
    }
}

#[async_trait]
impl CountryLocator for GeoClient {
    async fn locate(&self, country_code: &str) -> Result<Coordinates, GeoError> {
        let code = country_code.trim().to_uppercase();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(GeoError::InvalidCountryCode(country_code.to_owned()));
        }

        if let Some(hit) = self.cache.read().await.get(&code) {
            return Ok(*hit);
        }

        let coords = self.fetch(&code).await?;
        self.cache.write().await.insert(code, coords);
        Ok(coords)
    }
}

/// Extracts `Results.GeoPt` from a response body, unwrapping a body that is
/// itself a JSON-encoded string.
pub(crate) fn parse_geo_point(code: &str, body: &str) -> Result<Coordinates, GeoError> {
    let json_err = |source| GeoError::JsonParse { country_code: code.to_owned(), source };

    let mut value: serde_json::Value = serde_json::from_str(body).map_err(json_err)?;
    if let serde_json::Value::String(inner) = &value {
        value = serde_json::from_str(inner).map_err(json_err)?;
    }

    let point = value
        .pointer("/Results/GeoPt")
        .and_then(serde_json::Value::as_array)
        .filter(|arr| arr.len() == 2)
        .and_then(|arr| Some(Coordinates::new(arr.first()?.as_f64()?, arr.get(1)?.as_f64()?)))
        .filter(Coordinates::is_valid);

    point.ok_or_else(|| GeoError::MissingCoordinates(code.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_object_body() {
        let coords = parse_geo_point("RO", r#"{"Results":{"GeoPt":[46.0,25.0]}}"#).unwrap();
        assert_eq!(coords, Coordinates::new(46.0, 25.0));
    }

    #[test]
    fn test_parse_string_wrapped_body() {
        let body = serde_json::to_string(r#"{"Results":{"GeoPt":[46.0,25.0]}}"#).unwrap();
        let coords = parse_geo_point("RO", &body).unwrap();
        assert_eq!(coords, Coordinates::new(46.0, 25.0));
    }

    #[test]
    fn test_parse_missing_or_malformed_point() {
        assert!(matches!(
            parse_geo_point("RO", r#"{"Results":{}}"#),
            Err(GeoError::MissingCoordinates(_))
        ));
        assert!(matches!(
            parse_geo_point("RO", r#"{"Results":{"GeoPt":[46.0]}}"#),
            Err(GeoError::MissingCoordinates(_))
        ));
        assert!(matches!(
            parse_geo_point("RO", r#"{"Results":{"GeoPt":["a","b"]}}"#),
            Err(GeoError::MissingCoordinates(_))
        ));
        assert!(matches!(parse_geo_point("RO", "<html>"), Err(GeoError::JsonParse { .. })));
    }

    #[tokio::test]
    async fn test_locate_fetches_once_then_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/countries/RO.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Results":{"GeoPt":[46.0,25.0]}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GeoClient::new(format!("{}/countries", server.uri())).unwrap();

        let first = client.locate("ro").await.unwrap();
        let second = client.locate("RO").await.unwrap();

        assert_eq!(first, Coordinates::new(46.0, 25.0));
        assert_eq!(first, second);
        assert_eq!(client.cached_len().await, 1);
    }

    #[tokio::test]
    async fn test_locate_failure_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/XX.json"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&server)
            .await;

        let client = GeoClient::new(server.uri()).unwrap();

        for _ in 0..2 {
            let err = client.locate("XX").await.unwrap_err();
            assert!(matches!(err, GeoError::HttpStatus { code: 404, .. }));
            assert!(!err.is_transient());
        }
        assert_eq!(client.cached_len().await, 0);
    }

    #[tokio::test]
    async fn test_locate_rejects_bad_code_without_request() {
        let client = GeoClient::new("http://127.0.0.1:9/").unwrap();
        assert!(matches!(client.locate("ROU").await, Err(GeoError::InvalidCountryCode(_))));
        assert!(matches!(client.locate("").await, Err(GeoError::InvalidCountryCode(_))));
    }
}
