//! Weather retrieval client
//!
//! Calls the `get-weather` function, which aggregates the upstream provider and
//! returns a ready-to-render [`WeatherSnapshot`] already converted to metric units.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use super::{
    check_status, http_client, validate_coordinate, Endpoint, RemoteError, WeatherClient,
    WeatherSnapshot, MAX_FORECAST_DAYS,
};
use crate::location::Coordinate;

/// Request body of the weather function
#[derive(Debug, Serialize)]
struct WeatherRequest {
    latitude: f64,
    longitude: f64,
}

/// HTTP implementation of [`WeatherClient`]
#[derive(Debug, Clone)]
pub struct HttpWeatherClient {
    client: Client,
    endpoint: Endpoint,
}

impl HttpWeatherClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            client: http_client(&endpoint),
            endpoint,
        }
    }

    /// Endpoint this client posts to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// Turns a raw weather function response into a snapshot
///
/// # Returns
/// * `Ok(WeatherSnapshot)` with at most [`MAX_FORECAST_DAYS`] forecast entries
/// * `Err(RemoteError::InvalidRequest)` for HTTP 400
/// * `Err(RemoteError::Status)` for other non-2xx statuses
/// * `Err(RemoteError::Rejected)` when a 2xx body carries `error`
/// * `Err(RemoteError::Parse)` for anything else that is not a snapshot
pub fn parse_weather_response(status: u16, body: &str) -> Result<WeatherSnapshot, RemoteError> {
    check_status(status, body)?;

    let value: serde_json::Value = serde_json::from_str(body)?;
    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
        return Err(RemoteError::Rejected(error.to_string()));
    }

    let mut snapshot: WeatherSnapshot = serde_json::from_value(value)?;
    snapshot.forecast.truncate(MAX_FORECAST_DAYS);
    Ok(snapshot)
}

#[async_trait]
impl WeatherClient for HttpWeatherClient {
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, RemoteError> {
        validate_coordinate(&coordinate)?;

        debug!(
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            "fetching weather"
        );

        let response = self
            .endpoint
            .post(&self.client)
            .json(&WeatherRequest {
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
            })
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let snapshot = parse_weather_response(status, &body)?;
        info!(
            location = %snapshot.current.location_name,
            alerts = snapshot.alerts.len(),
            "weather fetched"
        );
        Ok(snapshot)
    }
}
