//! Application configuration and user settings
//!
//! Configuration is loaded once at startup, in increasing priority:
//! 1. Default values in code
//! 2. `config.toml` in the platform config directory (or an explicit `--config` file)
//! 3. Environment variable overrides with the `DISASTERWATCH_` prefix (`__` nests keys)
//!
//! User settings are the in-memory toggles of the Settings screen. They are not persisted.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::data::Endpoint;
use crate::location::{Coordinate, PositionOptions, DEFAULT_LOOKUP_URL};
use crate::sos::{SosConfig, TICK_INTERVAL};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "DISASTERWATCH";

/// Error types for configuration loading
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// A source could not be read or deserialized
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Values were read but are not usable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub endpoints: EndpointsConfig,
    pub location: LocationConfig,
    pub sos: SosSettings,
    pub weather: WeatherSettings,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

/// Remote function endpoints
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    /// Base URL the function paths are appended to
    pub base_url: String,
    pub weather_path: String,
    pub sos_path: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

/// Which geolocation provider backs the app
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// IP-based lookup
    Ip,
    /// Manually configured coordinate
    Fixed,
    /// No provider; weather uses the default coordinate and SOS sends without a fix
    None,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    pub provider: ProviderKind,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub lookup_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SosSettings {
    pub countdown_secs: u32,
    pub location_timeout_ms: u64,
    /// Number offered on the degraded sent screen
    pub emergency_number: String,
    /// Contacts reported as alerted on the sent screen
    pub emergency_contacts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    pub location_timeout_ms: u64,
}

/// Default location of the configuration file, if the platform has one
pub fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "disasterwatch")?;
    Some(dirs.config_dir().join("config.toml"))
}

/// Joins a base URL and a function path with exactly one slash
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment variables
    ///
    /// # Arguments
    /// * `path` - Explicit config file; must exist when given. Without it the default
    ///   path is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .set_default("endpoints.base_url", "http://localhost:54321/functions/v1")?
            .set_default("endpoints.weather_path", "get-weather")?
            .set_default("endpoints.sos_path", "save-sos-location")?
            .set_default("endpoints.request_timeout_secs", 15_i64)?
            .set_default("location.provider", "ip")?
            .set_default("location.lookup_url", DEFAULT_LOOKUP_URL)?
            .set_default("sos.countdown_secs", 5_i64)?
            .set_default("sos.location_timeout_ms", 10_000_i64)?
            .set_default("sos.emergency_number", "911")?
            .set_default("sos.emergency_contacts", 3_i64)?
            .set_default("weather.location_timeout_ms", 10_000_i64)?
            .set_default("log_level", "info")?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => match default_config_path() {
                Some(default) => builder.add_source(File::from(default).required(false)),
                None => builder,
            },
        };

        let config = builder
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: AppConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Rejects values that would only fail later, inside the running UI
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.sos.countdown_secs == 0 {
            return Err(ConfigLoadError::Invalid(
                "sos.countdown_secs must be at least 1".to_string(),
            ));
        }

        for (key, value) in [
            ("sos.location_timeout_ms", self.sos.location_timeout_ms),
            ("weather.location_timeout_ms", self.weather.location_timeout_ms),
            ("endpoints.request_timeout_secs", self.endpoints.request_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigLoadError::Invalid(format!("{} must be at least 1", key)));
            }
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(latitude), Some(longitude)) => {
                if !Coordinate::new(latitude, longitude).is_valid() {
                    return Err(ConfigLoadError::Invalid(format!(
                        "location {}, {} is out of range",
                        latitude, longitude
                    )));
                }
            }
            (None, None) if self.location.provider == ProviderKind::Fixed => {
                return Err(ConfigLoadError::Invalid(
                    "location.provider = \"fixed\" requires latitude and longitude".to_string(),
                ));
            }
            (None, None) => {}
            _ => {
                return Err(ConfigLoadError::Invalid(
                    "location.latitude and location.longitude must be set together".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Configured fixed coordinate, if both halves are present
    pub fn fixed_coordinate(&self) -> Option<Coordinate> {
        self.location
            .latitude
            .zip(self.location.longitude)
            .map(|(latitude, longitude)| Coordinate::new(latitude, longitude))
    }

    fn endpoint(&self, path: &str) -> Endpoint {
        Endpoint::new(join_url(&self.endpoints.base_url, path))
            .with_api_key(self.endpoints.api_key.clone())
            .with_timeout(Duration::from_secs(self.endpoints.request_timeout_secs))
    }

    pub fn weather_endpoint(&self) -> Endpoint {
        self.endpoint(&self.endpoints.weather_path)
    }

    pub fn sos_endpoint(&self) -> Endpoint {
        self.endpoint(&self.endpoints.sos_path)
    }

    pub fn sos_config(&self) -> SosConfig {
        SosConfig {
            countdown_secs: self.sos.countdown_secs,
            tick_interval: TICK_INTERVAL,
            location_timeout: Duration::from_millis(self.sos.location_timeout_ms),
        }
    }

    /// Position options for the weather flow
    pub fn weather_position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: false,
            timeout: Duration::from_millis(self.weather.location_timeout_ms),
        }
    }
}

/// A user-facing switch on the Settings screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    PushNotifications,
    SoundAlerts,
    Vibration,
    LocationServices,
    OfflineMode,
    DarkMode,
}

impl Toggle {
    /// All toggles in screen order
    pub const ALL: [Toggle; 6] = [
        Toggle::PushNotifications,
        Toggle::SoundAlerts,
        Toggle::Vibration,
        Toggle::LocationServices,
        Toggle::OfflineMode,
        Toggle::DarkMode,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Toggle::PushNotifications => "Push Notifications",
            Toggle::SoundAlerts => "Sound Alerts",
            Toggle::Vibration => "Vibration",
            Toggle::LocationServices => "Location Services",
            Toggle::OfflineMode => "Offline Mode",
            Toggle::DarkMode => "Dark Mode",
        }
    }

    pub fn description(&self) -> Option<&'static str> {
        match self {
            Toggle::LocationServices => Some("Required for SOS"),
            Toggle::OfflineMode => Some("Cache data for offline use"),
            _ => None,
        }
    }

    /// Section heading the toggle is listed under
    pub fn section(&self) -> &'static str {
        match self {
            Toggle::PushNotifications | Toggle::SoundAlerts | Toggle::Vibration => "Notifications",
            Toggle::LocationServices => "Privacy & Location",
            Toggle::OfflineMode => "Connectivity",
            Toggle::DarkMode => "Appearance",
        }
    }
}

/// In-memory user settings
///
/// The location flag is shared with the location permission gate, so turning it off
/// makes every later position request fail with a permission error.
#[derive(Debug, Clone)]
pub struct Settings {
    push_notifications: bool,
    sound_alerts: bool,
    vibration: bool,
    location: Arc<AtomicBool>,
    offline_mode: bool,
    dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(Arc::new(AtomicBool::new(true)))
    }
}

impl Settings {
    pub fn new(location: Arc<AtomicBool>) -> Self {
        Self {
            push_notifications: true,
            sound_alerts: true,
            vibration: true,
            location,
            offline_mode: false,
            dark_mode: true,
        }
    }

    /// Flag to hand to the permission gate
    pub fn location_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.location)
    }

    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::PushNotifications => self.push_notifications,
            Toggle::SoundAlerts => self.sound_alerts,
            Toggle::Vibration => self.vibration,
            Toggle::LocationServices => self.location.load(Ordering::SeqCst),
            Toggle::OfflineMode => self.offline_mode,
            Toggle::DarkMode => self.dark_mode,
        }
    }

    /// Flips `toggle` and returns its new value
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        let value = !self.get(toggle);
        match toggle {
            Toggle::PushNotifications => self.push_notifications = value,
            Toggle::SoundAlerts => self.sound_alerts = value,
            Toggle::Vibration => self.vibration = value,
            Toggle::LocationServices => self.location.store(value, Ordering::SeqCst),
            Toggle::OfflineMode => self.offline_mode = value,
            Toggle::DarkMode => self.dark_mode = value,
        }
        value
    }
}
