//! Geolocation service
//!
//! Wraps the host's notion of "where am I" behind the [`LocationProvider`] trait so the
//! SOS and weather controllers can be driven by deterministic fakes in tests. A terminal
//! has no GPS, so the shipped providers are an IP lookup, a manually configured fix and
//! a "no provider" stub, optionally wrapped in a [`PermissionGate`] that mirrors the
//! Settings location toggle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Mean Earth radius in kilometres, used for great-circle distances
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate substituted when the weather flow cannot get a position (Mumbai, India)
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    latitude: 19.0760,
    longitude: 72.8777,
};

/// Timeout used by both flows when asking for a position
pub const DEFAULT_POSITION_TIMEOUT: Duration = Duration::from_secs(10);

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in kilometres (haversine)
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// Formats as `19.0760° N, 72.8777° E`
    pub fn display(&self) -> String {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        format!(
            "{:.4}° {}, {:.4}° {}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask the provider for its most precise fix
    pub high_accuracy: bool,
    /// Give up after this long
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_POSITION_TIMEOUT,
        }
    }
}

/// Reasons a position could not be obtained
///
/// Every variant means "position unavailable"; callers choose whether to fall back.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocationError {
    /// The user turned location services off
    #[error("position unavailable: location permission denied")]
    PermissionDenied,

    /// No provider could answer
    #[error("position unavailable: no location provider")]
    NoProvider,

    /// The provider did not answer in time
    #[error("position unavailable: timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The provider answered with an error
    #[error("position unavailable: {0}")]
    Lookup(String),
}

impl LocationError {
    /// All location errors belong to the position-unavailable class
    pub fn is_position_unavailable(&self) -> bool {
        true
    }
}

/// Source of the device position
///
/// Implementors only provide [`LocationProvider::locate`]; the timeout is applied by
/// [`LocationProvider::current_position`]. No retries happen at this layer.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Resolves the position without any deadline
    async fn locate(&self, high_accuracy: bool) -> Result<Coordinate, LocationError>;

    /// Resolves the position, failing with [`LocationError::Timeout`] after `options.timeout`
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        match tokio::time::timeout(options.timeout, self.locate(options.high_accuracy)).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout(options.timeout)),
        }
    }
}

/// Where a resolved coordinate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// The provider answered
    Device,
    /// The provider failed and [`DEFAULT_COORDINATE`] was used
    Fallback,
}

/// Asks `provider` for a position and substitutes [`DEFAULT_COORDINATE`] on any failure
///
/// Used by the weather flow only: the error is logged, never surfaced.
pub async fn resolve_or_default(
    provider: &dyn LocationProvider,
    options: PositionOptions,
) -> (Coordinate, LocationSource) {
    match provider.current_position(options).await {
        Ok(coordinate) => (coordinate, LocationSource::Device),
        Err(e) => {
            warn!(error = %e, "geolocation failed, using default coordinate");
            (DEFAULT_COORDINATE, LocationSource::Fallback)
        }
    }
}

/// A fixed, manually configured position
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn locate(&self, _high_accuracy: bool) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// A host with no location support at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn locate(&self, _high_accuracy: bool) -> Result<Coordinate, LocationError> {
        Err(LocationError::NoProvider)
    }
}

/// Default IP geolocation endpoint
pub const DEFAULT_LOOKUP_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Response body of the IP geolocation endpoint
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Approximates the position from the public IP address
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    lookup_url: String,
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_URL)
    }
}

impl IpLocator {
    pub fn new(lookup_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            lookup_url: lookup_url.into(),
        }
    }

    /// Parses the lookup body into a coordinate
    fn parse_response(body: &str) -> Result<Coordinate, LocationError> {
        let response: IpLookupResponse = serde_json::from_str(body)
            .map_err(|e| LocationError::Lookup(format!("malformed lookup response: {}", e)))?;

        if response.status != "success" {
            return Err(LocationError::Lookup(
                response
                    .message
                    .unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (response.lat, response.lon) {
            (Some(lat), Some(lon)) => {
                let coordinate = Coordinate::new(lat, lon);
                if coordinate.is_valid() {
                    Ok(coordinate)
                } else {
                    Err(LocationError::Lookup("lookup returned invalid coordinates".to_string()))
                }
            }
            _ => Err(LocationError::Lookup("lookup response missing coordinates".to_string())),
        }
    }
}

#[async_trait]
impl LocationProvider for IpLocator {
    async fn locate(&self, high_accuracy: bool) -> Result<Coordinate, LocationError> {
        if high_accuracy {
            debug!("high accuracy requested; IP lookup is the best available fix");
        }

        let response = self
            .client
            .get(&self.lookup_url)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "IP geolocation request failed");
                LocationError::NoProvider
            })?;
        let body = response
            .text()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        Self::parse_response(&body)
    }
}

/// Denies positions while the location-services toggle is off
pub struct PermissionGate {
    inner: Arc<dyn LocationProvider>,
    enabled: Arc<AtomicBool>,
}

impl PermissionGate {
    pub fn new(inner: Arc<dyn LocationProvider>, enabled: Arc<AtomicBool>) -> Self {
        Self { inner, enabled }
    }
}

#[async_trait]
impl LocationProvider for PermissionGate {
    async fn locate(&self, high_accuracy: bool) -> Result<Coordinate, LocationError> {
        if !self.enabled.load(Ordering::SeqCst) {
            return Err(LocationError::PermissionDenied);
        }
        self.inner.locate(high_accuracy).await
    }
}
