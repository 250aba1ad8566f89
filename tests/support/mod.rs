//! Deterministic fakes for the injected services

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use disasterwatch::data::alerts::parse_submission_response;
use disasterwatch::data::{
    AlertClient, AlertSubmission, CurrentConditions, RemoteError, SubmissionReceipt,
    WeatherClient, WeatherSnapshot,
};
use disasterwatch::location::{Coordinate, LocationError, LocationProvider};

/// Location provider returning a fixed result after an optional delay
pub struct ScriptedLocation {
    result: Result<Coordinate, LocationError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedLocation {
    pub fn at(coordinate: Coordinate) -> Self {
        Self::new(Ok(coordinate), Duration::ZERO)
    }

    pub fn failing(error: LocationError) -> Self {
        Self::new(Err(error), Duration::ZERO)
    }

    pub fn new(result: Result<Coordinate, LocationError>, delay: Duration) -> Self {
        Self {
            result,
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocation {
    async fn locate(&self, _high_accuracy: bool) -> Result<Coordinate, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Builds a snapshot the way the weather function would answer
pub fn snapshot_for(location: &str, condition: &str, wind_kmh: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        current: CurrentConditions {
            temperature: 29.0,
            feels_like: 33.0,
            humidity: 84.0,
            pressure: 1002.0,
            visibility_km: 4.0,
            wind_speed_kmh: wind_kmh,
            wind_direction_deg: Some(250.0),
            condition_code: "09d".to_string(),
            condition_text: condition.to_string(),
            description: condition.to_lowercase(),
            clouds_pct: 100.0,
            location_name: location.to_string(),
            country_code: "IN".to_string(),
            sunrise: 1_721_003_400,
            sunset: 1_721_051_400,
        },
        alerts: Vec::new(),
        forecast: Vec::new(),
        fetched_at_epoch_ms: 1_721_040_000_000,
    }
}

/// One scripted weather answer
pub struct WeatherReply {
    pub delay: Duration,
    pub result: Result<WeatherSnapshot, String>,
}

impl WeatherReply {
    pub fn ok(snapshot: WeatherSnapshot) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(snapshot),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(message.to_string()),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Weather client answering from a queue and recording requested coordinates
#[derive(Default)]
pub struct ScriptedWeather {
    replies: Mutex<VecDeque<WeatherReply>>,
    pub requests: Mutex<Vec<Coordinate>>,
}

impl ScriptedWeather {
    pub fn new(replies: Vec<WeatherReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Coordinate> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherClient for ScriptedWeather {
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, RemoteError> {
        self.requests.lock().unwrap().push(coordinate);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| WeatherReply::err("no scripted reply"));

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result.map_err(|message| RemoteError::Status {
            status: 502,
            message,
        })
    }
}

/// Alert client that behaves like the submission function: it stores and echoes the record
#[derive(Default)]
pub struct EchoAlerts {
    pub submissions: Mutex<Vec<AlertSubmission>>,
}

impl EchoAlerts {
    pub fn submissions(&self) -> Vec<AlertSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertClient for EchoAlerts {
    async fn submit(&self, submission: &AlertSubmission) -> Result<SubmissionReceipt, RemoteError> {
        self.submissions.lock().unwrap().push(submission.clone());

        let mut record = serde_json::to_value(submission)?;
        record["status"] = serde_json::json!("active");
        record["createdAt"] = serde_json::json!("2024-07-15T14:30:06.120Z");
        if let (Some(lat), Some(lon)) = (submission.latitude, submission.longitude) {
            record["location"] = serde_json::json!({"type": "Point", "coordinates": [lon, lat]});
        }
        let body = serde_json::json!({
            "success": true,
            "message": "SOS alert recorded",
            "data": record,
        });
        parse_submission_response(200, &body.to_string())
    }
}

/// Alert client whose endpoint is down
#[derive(Default)]
pub struct DownAlerts {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl AlertClient for DownAlerts {
    async fn submit(&self, _submission: &AlertSubmission) -> Result<SubmissionReceipt, RemoteError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        parse_submission_response(500, r#"{"success":false,"error":"MongoDB URI not configured"}"#)
    }
}
