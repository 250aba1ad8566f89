//! Fakes shared by the unit tests of the app shell and renderers

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::app::{App, AppOptions, Services};
use crate::data::{
    AlertClient, AlertSubmission, CurrentConditions, RemoteError, SubmissionReceipt,
    WeatherAlert, WeatherClient, WeatherSnapshot,
};
use crate::location::{Coordinate, FixedLocation};
use crate::settings::Settings;

pub const HERE: Coordinate = Coordinate {
    latitude: 40.7306,
    longitude: -73.9866,
};

/// A snapshot with the given condition, wind and number of alerts
pub fn snapshot(condition: &str, wind_kmh: f64, alerts: usize) -> WeatherSnapshot {
    WeatherSnapshot {
        current: CurrentConditions {
            temperature: 24.6,
            feels_like: 26.1,
            humidity: 78.0,
            pressure: 1006.0,
            visibility_km: 8.0,
            wind_speed_kmh: wind_kmh,
            wind_direction_deg: Some(225.0),
            condition_code: "10d".to_string(),
            condition_text: condition.to_string(),
            description: condition.to_lowercase(),
            clouds_pct: 75.0,
            location_name: "New York".to_string(),
            country_code: "US".to_string(),
            sunrise: 1_721_037_600,
            sunset: 1_721_090_400,
        },
        alerts: (0..alerts)
            .map(|i| WeatherAlert {
                event: format!("Coastal Flood Warning {}", i + 1),
                sender: "NWS New York".to_string(),
                start_epoch: 1_721_040_000,
                end_epoch: 1_721_080_000,
                description: "Minor coastal flooding expected.".to_string(),
                tags: ["Flood".to_string()].into_iter().collect(),
            })
            .collect(),
        forecast: Vec::new(),
        fetched_at_epoch_ms: 1_721_050_000_000,
    }
}

/// Weather client answering every request with the same snapshot
pub struct CannedWeather(pub WeatherSnapshot);

#[async_trait]
impl WeatherClient for CannedWeather {
    async fn fetch_weather(&self, _coordinate: Coordinate) -> Result<WeatherSnapshot, RemoteError> {
        Ok(self.0.clone())
    }
}

/// Alert client that accepts and records every submission
#[derive(Default)]
pub struct RecordingAlerts {
    pub submissions: Mutex<Vec<AlertSubmission>>,
}

#[async_trait]
impl AlertClient for RecordingAlerts {
    async fn submit(&self, submission: &AlertSubmission) -> Result<SubmissionReceipt, RemoteError> {
        if let Ok(mut submissions) = self.submissions.lock() {
            submissions.push(submission.clone());
        }
        Ok(SubmissionReceipt {
            message: Some("SOS alert recorded".to_string()),
            data: None,
        })
    }
}

/// An App wired to a fixed position and well-behaved fakes
pub fn test_app() -> App {
    let services = Services {
        location: Arc::new(FixedLocation(HERE)),
        weather: Arc::new(CannedWeather(snapshot("Clouds", 12.0, 0))),
        alerts: Arc::new(RecordingAlerts::default()),
    };
    App::new(services, Settings::default(), AppOptions::default())
}
