//! Alert submission client
//!
//! Posts SOS alerts and location shares to the `save-sos-location` function.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{check_status, http_client, validate_coordinate, AlertClient, Endpoint, RemoteError};
use crate::location::Coordinate;

/// Collection name used for location shares
pub const LOCATION_SHARE_COLLECTION: &str = "locations";

/// Event type used for location shares
pub const LOCATION_SHARE_TYPE: &str = "location_share";

/// Identifies the sending client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub user_agent: String,
    pub platform: String,
}

impl DeviceInfo {
    /// Info for this build running on this host
    pub fn current() -> Self {
        Self {
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            platform: std::env::consts::OS.to_string(),
        }
    }
}

/// Request body of the submission function
///
/// `latitude`/`longitude` are serialized as `null` when an SOS had no fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSubmission {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// ISO-8601, millisecond precision, UTC
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl AlertSubmission {
    /// An emergency alert, with or without a position
    pub fn sos(coordinate: Option<Coordinate>, at: DateTime<Utc>, device: DeviceInfo) -> Self {
        Self {
            latitude: coordinate.map(|c| c.latitude),
            longitude: coordinate.map(|c| c.longitude),
            timestamp: iso_timestamp(at),
            device_info: Some(device),
            collection: None,
            kind: None,
        }
    }

    /// A plain location share, outside the SOS countdown
    pub fn location_share(coordinate: Coordinate, at: DateTime<Utc>) -> Self {
        Self {
            latitude: Some(coordinate.latitude),
            longitude: Some(coordinate.longitude),
            timestamp: iso_timestamp(at),
            device_info: None,
            collection: Some(LOCATION_SHARE_COLLECTION.to_string()),
            kind: Some(LOCATION_SHARE_TYPE.to_string()),
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn is_location_share(&self) -> bool {
        self.kind.as_deref() == Some(LOCATION_SHARE_TYPE)
    }

    /// Rejects half-present or out-of-range coordinates, and shares without any
    pub fn validate(&self) -> Result<(), RemoteError> {
        match (self.latitude, self.longitude) {
            (Some(_), Some(_)) => match self.coordinate() {
                Some(c) => validate_coordinate(&c),
                None => Ok(()),
            },
            (None, None) if self.is_location_share() => Err(RemoteError::InvalidRequest(
                "location share requires coordinates".to_string(),
            )),
            (None, None) => Ok(()),
            _ => Err(RemoteError::InvalidRequest(
                "latitude and longitude must be sent together".to_string(),
            )),
        }
    }
}

/// The record the function stored, echoed back in `data`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAlert {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub timestamp: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
}

impl RecordedAlert {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Parses the echoed timestamp as ISO-8601
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Successful submission outcome
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub message: Option<String>,
    pub data: Option<RecordedAlert>,
}

/// Wire shape of every submission response
#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RecordedAlert>,
    #[serde(default)]
    error: Option<String>,
}

/// Turns a raw submission response into a receipt
pub fn parse_submission_response(status: u16, body: &str) -> Result<SubmissionReceipt, RemoteError> {
    check_status(status, body)?;

    let response: SubmissionResponse = serde_json::from_str(body)?;
    if !response.success {
        return Err(RemoteError::Rejected(
            response
                .error
                .or(response.message)
                .unwrap_or_else(|| "submission rejected".to_string()),
        ));
    }

    Ok(SubmissionReceipt {
        message: response.message,
        data: response.data,
    })
}

/// HTTP implementation of [`AlertClient`]
#[derive(Debug, Clone)]
pub struct HttpAlertClient {
    client: Client,
    endpoint: Endpoint,
}

impl HttpAlertClient {
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

#[async_trait]
impl AlertClient for HttpAlertClient {
    async fn submit(&self, submission: &AlertSubmission) -> Result<SubmissionReceipt, RemoteError> {
        submission.validate()?;

        let response = self
            .endpoint
            .post(&self.client)
            .json(submission)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "alert submission request failed");
                RemoteError::from(e)
            })?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let receipt = parse_submission_response(status, &body)?;
        info!(
            share = submission.is_location_share(),
            has_location = submission.coordinate().is_some(),
            "alert submission recorded"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 14, 30, 5).unwrap()
    }

    fn device() -> DeviceInfo {
        DeviceInfo {
            user_agent: "disasterwatch/0.1.0".to_string(),
            platform: "linux".to_string(),
        }
    }

    #[test]
    fn test_sos_submission_json_shape() {
        let submission =
            AlertSubmission::sos(Some(Coordinate::new(19.076, 72.8777)), fixed_time(), device());
        let json = serde_json::to_value(&submission).unwrap();

        assert_eq!(json["latitude"], 19.076);
        assert_eq!(json["longitude"], 72.8777);
        assert_eq!(json["timestamp"], "2024-07-15T14:30:05.000Z");
        assert_eq!(json["deviceInfo"]["userAgent"], "disasterwatch/0.1.0");
        assert_eq!(json["deviceInfo"]["platform"], "linux");
        assert!(json.get("collection").is_none());
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_sos_without_location_sends_nulls() {
        let submission = AlertSubmission::sos(None, fixed_time(), device());
        let json = serde_json::to_value(&submission).unwrap();

        assert!(json["latitude"].is_null());
        assert!(json["longitude"].is_null());
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_location_share_json_shape() {
        let submission = AlertSubmission::location_share(Coordinate::new(1.5, 2.5), fixed_time());
        let json = serde_json::to_value(&submission).unwrap();

        assert_eq!(json["collection"], "locations");
        assert_eq!(json["type"], "location_share");
        assert!(json.get("deviceInfo").is_none());
        assert!(submission.is_location_share());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let submission = AlertSubmission::sos(Some(Coordinate::new(0.0, 200.0)), fixed_time(), device());
        assert!(submission.validate().unwrap_err().is_invalid_request());
    }

    #[test]
    fn test_validate_rejects_half_coordinate() {
        let mut submission = AlertSubmission::sos(None, fixed_time(), device());
        submission.latitude = Some(10.0);
        assert!(submission.validate().unwrap_err().is_invalid_request());
    }

    #[test]
    fn test_validate_rejects_share_without_coordinates() {
        let mut submission = AlertSubmission::location_share(Coordinate::new(1.0, 1.0), fixed_time());
        submission.latitude = None;
        submission.longitude = None;
        assert!(submission.validate().unwrap_err().is_invalid_request());
    }

    #[test]
    fn test_parse_success_echoes_submission() {
        let body = r#"{
            "success": true,
            "message": "SOS alert recorded",
            "data": {
                "location": {"type": "Point", "coordinates": [72.8777, 19.076]},
                "latitude": 19.076,
                "longitude": 72.8777,
                "timestamp": "2024-07-15T14:30:05.000Z",
                "deviceInfo": {"userAgent": "disasterwatch/0.1.0", "platform": "linux"},
                "status": "active",
                "createdAt": "2024-07-15T14:30:06.120Z"
            }
        }"#;
        let receipt = parse_submission_response(200, body).unwrap();
        assert_eq!(receipt.message.as_deref(), Some("SOS alert recorded"));

        let data = receipt.data.unwrap();
        let c = data.coordinate().unwrap();
        assert!((c.latitude - 19.076).abs() < 1e-9);
        assert!((c.longitude - 72.8777).abs() < 1e-9);
        assert_eq!(data.recorded_at(), Some(fixed_time()));
        assert_eq!(data.status.as_deref(), Some("active"));
        assert_eq!(data.device_info, Some(device()));
    }

    #[test]
    fn test_parse_success_false_is_rejected() {
        let err = parse_submission_response(200, r#"{"success":false,"error":"quota exceeded"}"#)
            .unwrap_err();
        assert!(matches!(err, RemoteError::Rejected(ref m) if m == "quota exceeded"));
    }

    #[test]
    fn test_parse_server_error() {
        let err = parse_submission_response(
            500,
            r#"{"success":false,"error":"MongoDB URI not configured"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 500, .. }));
    }

    #[test]
    fn test_device_info_current() {
        let info = DeviceInfo::current();
        assert!(info.user_agent.starts_with("disasterwatch/"));
        assert!(!info.platform.is_empty());
    }
}
