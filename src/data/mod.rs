//! Core data models and remote service contracts
//!
//! This module holds the weather snapshot types returned by the weather function,
//! the remote error taxonomy shared by both HTTP clients, and the injectable
//! [`WeatherClient`] / [`AlertClient`] traits the controllers depend on.

pub mod alerts;
pub mod notices;
pub mod places;
pub mod weather;

pub use alerts::{
    AlertSubmission, DeviceInfo, HttpAlertClient, RecordedAlert, SubmissionReceipt,
    LOCATION_SHARE_COLLECTION, LOCATION_SHARE_TYPE,
};
pub use notices::{all_notices, Notice, NoticeKind};
pub use places::{all_places, Place, PlaceKind};
pub use weather::HttpWeatherClient;

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::location::Coordinate;

/// Forecast entries kept per snapshot
pub const MAX_FORECAST_DAYS: usize = 5;

/// Current conditions at the resolved location
///
/// Field names follow the weather function's wire format; units are °C, km/h, km and hPa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    #[serde(rename = "visibility")]
    pub visibility_km: f64,
    #[serde(rename = "wind_speed")]
    pub wind_speed_kmh: f64,
    #[serde(rename = "wind_direction", default)]
    pub wind_direction_deg: Option<f64>,
    /// Provider icon code, e.g. `10d`
    #[serde(rename = "weather_icon", default)]
    pub condition_code: String,
    /// Short condition, e.g. `Rain` or `Thunderstorm`
    #[serde(rename = "weather")]
    pub condition_text: String,
    /// Long condition, e.g. `light rain`
    #[serde(rename = "weather_description", default)]
    pub description: String,
    #[serde(rename = "clouds", default)]
    pub clouds_pct: f64,
    #[serde(rename = "location", default)]
    pub location_name: String,
    #[serde(rename = "country", default)]
    pub country_code: String,
    /// Unix seconds
    #[serde(default)]
    pub sunrise: i64,
    /// Unix seconds
    #[serde(default)]
    pub sunset: i64,
}

/// An official weather alert issued for the location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub event: String,
    #[serde(default)]
    pub sender: String,
    #[serde(rename = "start", default)]
    pub start_epoch: i64,
    #[serde(rename = "end", default)]
    pub end_epoch: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// One day of the short-range forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    #[serde(rename = "date")]
    pub date_epoch: i64,
    /// `null` when the upstream day had no usable reading
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(rename = "weather_icon", default)]
    pub condition_code: String,
    #[serde(rename = "weather", default)]
    pub condition_text: String,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(rename = "wind_speed", default)]
    pub wind_speed_kmh: f64,
}

/// Everything the weather function returned for one request
///
/// Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
    #[serde(default)]
    pub forecast: Vec<ForecastDay>,
    #[serde(rename = "timestamp")]
    pub fetched_at_epoch_ms: i64,
}

/// Failures of the two remote functions
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failure (DNS, connect, timeout, body read)
    #[error("network error: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status other than 400
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body reports an error
    #[error("{0}")]
    Rejected(String),

    /// Body was not the expected JSON
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing or out-of-range coordinates, caught locally or reported as HTTP 400
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteError {
    /// Whether this is a malformed-request error rather than a failed call
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, RemoteError::InvalidRequest(_))
    }
}

/// Where and how to reach one remote function
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub url: String,
    /// Sent as `apikey` and bearer token when present
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds a JSON POST with the auth headers applied
    pub(crate) fn post(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let request = client.post(&self.url);
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }
}

/// Builds an HTTP client honouring the endpoint timeout
pub(crate) fn http_client(endpoint: &Endpoint) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(endpoint.timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Error body shape used by both functions
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extracts `error` (or `message`) from a JSON body, if any
pub(crate) fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.or(parsed.message)
}

/// Maps non-2xx statuses onto the error taxonomy
pub(crate) fn check_status(status: u16, body: &str) -> Result<(), RemoteError> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    let message = error_message(body).unwrap_or_else(|| format!("HTTP {}", status));
    if status == 400 {
        Err(RemoteError::InvalidRequest(message))
    } else {
        Err(RemoteError::Status { status, message })
    }
}

/// Validates a coordinate before it is sent anywhere
pub(crate) fn validate_coordinate(coordinate: &Coordinate) -> Result<(), RemoteError> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(RemoteError::InvalidRequest(format!(
            "coordinates out of range: {}, {}",
            coordinate.latitude, coordinate.longitude
        )))
    }
}

/// Weather retrieval function
#[async_trait]
pub trait WeatherClient: Send + Sync {
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, RemoteError>;
}

/// Alert submission function
#[async_trait]
pub trait AlertClient: Send + Sync {
    async fn submit(&self, submission: &AlertSubmission) -> Result<SubmissionReceipt, RemoteError>;
}
