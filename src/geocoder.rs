use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const ENDPOINT: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const UNKNOWN: &str = "Unknown";

#[derive(Debug)]
pub enum GeocodeError {
    Network(reqwest::Error),
    Http(StatusCode),
    Json(serde_json::Error),
}

impl std::fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeError::Network(e) => write!(f, "Network error: {e}"),
            GeocodeError::Http(status) => write!(f, "HTTP {status}"),
            GeocodeError::Json(e) => write!(f, "Malformed response body: {e}"),
        }
    }
}

impl std::error::Error for GeocodeError {}

/// Human-readable location of a coordinate pair. Components the geocoder
/// cannot resolve are the literal string `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub postal: String,
    pub city: String,
    pub state: String,
}

impl Location {
    pub fn unknown() -> Self {
        Self {
            postal: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            state: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Address,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    postcode: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
}

impl Address {
    fn into_location(self) -> Location {
        Location {
            postal: self.postcode.unwrap_or_else(|| UNKNOWN.to_string()),
            city: self
                .city
                .or(self.town)
                .or(self.village)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            state: self.state.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder {
    pub fn new() -> Self {
        Self::with_base_url(ENDPOINT.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        // Nominatim's usage policy requires an identifying User-Agent.
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("runstash/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self { client, base_url }
    }

    /// Reverse geocode a coordinate pair to postal/city/state. Coordinates
    /// that resolve to no address (open water, for instance) come back with
    /// every component set to `"Unknown"`.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Location, GeocodeError> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={latitude}&lon={longitude}",
            self.base_url
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(GeocodeError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Http(status));
        }

        let body = response.text().await.map_err(GeocodeError::Network)?;
        let parsed: ReverseResponse = serde_json::from_str(&body).map_err(GeocodeError::Json)?;

        Ok(parsed.address.into_location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn reverse_maps_address_components() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/reverse")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("format".into(), "jsonv2".into()),
                Matcher::UrlEncoded("lat".into(), "37.5".into()),
                Matcher::UrlEncoded("lon".into(), "-122.25".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"address": {"postcode": "94062", "city": "Redwood City", "state": "California", "country": "United States"}}"#,
            )
            .create_async()
            .await;

        let location = Geocoder::with_base_url(server.url())
            .reverse(37.5, -122.25)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            location,
            Location {
                postal: "94062".to_string(),
                city: "Redwood City".to_string(),
                state: "California".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn reverse_falls_back_to_town_when_city_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"address": {"postcode": "05677", "town": "Waterbury", "state": "Vermont"}}"#)
            .create_async()
            .await;

        let location = Geocoder::with_base_url(server.url())
            .reverse(44.3, -72.7)
            .await
            .unwrap();

        assert_eq!(location.city, "Waterbury");
    }

    #[tokio::test]
    async fn reverse_returns_unknown_components_when_nothing_resolves() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "Unable to geocode"}"#)
            .create_async()
            .await;

        let location = Geocoder::with_base_url(server.url())
            .reverse(0.1, -160.0)
            .await
            .unwrap();

        assert_eq!(location, Location::unknown());
    }

    #[tokio::test]
    async fn reverse_fails_on_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let err = Geocoder::with_base_url(server.url())
            .reverse(37.5, -122.25)
            .await
            .unwrap_err();

        assert!(matches!(err, GeocodeError::Http(status) if status.as_u16() == 429));
    }
}
