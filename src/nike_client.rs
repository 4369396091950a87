use reqwest::StatusCode;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ENDPOINT: &str = "https://api.nike.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum FetchError {
    Network(reqwest::Error),
    Http(StatusCode),
    Json(serde_json::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "Network error: {e}"),
            FetchError::Http(status) => write!(f, "HTTP {status}"),
            FetchError::Json(e) => write!(f, "Malformed response body: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// A single GPS sample. `ZERO` doubles as the upstream "no GPS data" sentinel;
/// a latitude of exactly 0 is the only signal distinguishing the two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

impl Waypoint {
    pub const ZERO: Waypoint = Waypoint {
        latitude: 0.0,
        longitude: 0.0,
        elevation: 0.0,
    };

    pub fn has_fix(&self) -> bool {
        self.latitude != 0.0
    }
}

/// One recorded run as returned by the activity listing. Only the fields the
/// pipeline touches are typed; everything else the API sends is preserved
/// verbatim through `extra` so the upstream schema passes through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub activity_id: String,
    pub metric_summary: MetricSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_start: Option<Waypoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_end: Option<Waypoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Distance in kilometers, encoded by the API as a numeric string.
    pub distance: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ActivityListResponse {
    data: Vec<ActivityRecord>,
}

#[derive(Debug, Deserialize)]
struct GpsResponse {
    waypoints: Vec<Waypoint>,
}

pub struct NikeClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl NikeClient {
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(access_token, ENDPOINT.to_string())
    }

    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url,
            access_token,
        }
    }

    /// Fetch the `count` most recent running activities, most recent first.
    pub async fn fetch_activities(&self, count: u32) -> Result<Vec<ActivityRecord>, FetchError> {
        let url = format!(
            "{}/v1/me/sport/activities/RUNNING?count={count}&access_token={}",
            self.base_url,
            urlencoding::encode(&self.access_token)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Http(status));
        }

        let body = response.text().await.map_err(FetchError::Network)?;
        let parsed: ActivityListResponse =
            serde_json::from_str(&body).map_err(FetchError::Json)?;

        Ok(parsed.data)
    }

    /// Fetch the first and last GPS waypoint of an activity. A non-200 status
    /// yields the zero-waypoint sentinel pair instead of an error; the body is
    /// parsed as JSON before the status check, so an unparseable error body is
    /// still fatal. An activity with a single waypoint returns it as both ends.
    pub async fn fetch_gps(&self, activity_id: &str) -> Result<(Waypoint, Waypoint), FetchError> {
        let url = format!(
            "{}/v1/me/sport/activities/{activity_id}/gps?access_token={}",
            self.base_url,
            urlencoding::encode(&self.access_token)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::Network)?;
        let parsed: serde_json::Value = serde_json::from_str(&body).map_err(FetchError::Json)?;

        if status != StatusCode::OK {
            return Ok((Waypoint::ZERO, Waypoint::ZERO));
        }

        let gps: GpsResponse = serde_json::from_value(parsed).map_err(FetchError::Json)?;
        match (gps.waypoints.first(), gps.waypoints.last()) {
            (Some(&first), Some(&last)) => Ok((first, last)),
            _ => Err(FetchError::Json(serde_json::Error::custom(
                "waypoints array is empty",
            ))),
        }
    }
}
