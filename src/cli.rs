//! Command-line interface parsing for Disaster Watch
//!
//! Handles the launch flags: the initial tab, a manual position, disabling location,
//! and overrides for the config file, endpoint and log file.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::app::Tab;
use crate::location::Coordinate;
use crate::settings::{AppConfig, ProviderKind};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified tab name is not recognized
    #[error("Invalid tab: '{0}'. Valid tabs: dashboard, map, sos, alerts, settings")]
    InvalidTab(String),

    /// `--lat`/`--lon` outside the valid range
    #[error("Invalid coordinate: {0}, {1}")]
    InvalidCoordinate(f64, f64),
}

/// Disaster Watch - live weather risk, SOS alerts, shelters and notices
#[derive(Parser, Debug)]
#[command(name = "disasterwatch")]
#[command(about = "Disaster preparedness and SOS alerts in the terminal")]
#[command(version)]
pub struct Cli {
    /// Tab to open on launch
    ///
    /// Valid tabs: dashboard, map, sos, alerts, settings
    #[arg(long, value_name = "TAB")]
    pub tab: Option<String>,

    /// Use a fixed latitude instead of looking the position up
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Use a fixed longitude instead of looking the position up
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Run without any location provider
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub no_location: bool,

    /// Configuration file to load instead of the default one
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the remote functions
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Write logs to this file instead of the data directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupConfig {
    pub initial_tab: Tab,
    pub fixed_location: Option<Coordinate>,
    pub no_location: bool,
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Parses a tab name argument into a Tab.
///
/// # Arguments
/// * `s` - The tab name from CLI
///
/// # Returns
/// * `Ok(Tab)` if the name matches a tab
/// * `Err(CliError::InvalidTab)` otherwise
pub fn parse_tab_arg(s: &str) -> Result<Tab, CliError> {
    Tab::from_name(s).ok_or_else(|| CliError::InvalidTab(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_tab = match &cli.tab {
            Some(name) => parse_tab_arg(name)?,
            None => Tab::default(),
        };

        let fixed_location = match cli.lat.zip(cli.lon) {
            Some((lat, lon)) => {
                let coordinate = Coordinate::new(lat, lon);
                if !coordinate.is_valid() {
                    return Err(CliError::InvalidCoordinate(lat, lon));
                }
                Some(coordinate)
            }
            None => None,
        };

        Ok(StartupConfig {
            initial_tab,
            fixed_location,
            no_location: cli.no_location,
            config_path: cli.config.clone(),
            endpoint: cli.endpoint.clone(),
            log_file: cli.log_file.clone(),
        })
    }

    /// Applies the command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(coordinate) = self.fixed_location {
            config.location.provider = ProviderKind::Fixed;
            config.location.latitude = Some(coordinate.latitude);
            config.location.longitude = Some(coordinate.longitude);
        }
        if self.no_location {
            config.location.provider = ProviderKind::None;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoints.base_url = endpoint.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tab_arg() {
        assert_eq!(parse_tab_arg("dashboard").unwrap(), Tab::Dashboard);
        assert_eq!(parse_tab_arg("map").unwrap(), Tab::Map);
        assert_eq!(parse_tab_arg("SOS").unwrap(), Tab::Sos);
        assert_eq!(parse_tab_arg("alerts").unwrap(), Tab::Alerts);
        assert_eq!(parse_tab_arg("settings").unwrap(), Tab::Settings);
    }

    #[test]
    fn test_parse_tab_arg_invalid() {
        let err = parse_tab_arg("beach").unwrap_err();
        assert!(err.to_string().contains("Invalid tab"));
        assert!(err.to_string().contains("beach"));
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["disasterwatch"]);
        assert!(cli.tab.is_none());
        assert!(cli.lat.is_none());
        assert!(!cli.no_location);

        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config, StartupConfig::default());
        assert_eq!(config.initial_tab, Tab::Dashboard);
    }

    #[test]
    fn test_cli_parse_negative_coordinates() {
        let cli = Cli::parse_from(["disasterwatch", "--lat", "-33.87", "--lon", "151.21"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.fixed_location, Some(Coordinate::new(-33.87, 151.21)));
    }

    #[test]
    fn test_cli_lat_requires_lon() {
        assert!(Cli::try_parse_from(["disasterwatch", "--lat", "10"]).is_err());
        assert!(Cli::try_parse_from(["disasterwatch", "--lon", "10"]).is_err());
    }

    #[test]
    fn test_cli_no_location_conflicts_with_coordinates() {
        let result =
            Cli::try_parse_from(["disasterwatch", "--no-location", "--lat", "1", "--lon", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_out_of_range_coordinate() {
        let cli = Cli::parse_from(["disasterwatch", "--lat", "91", "--lon", "0"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidCoordinate(_, _))
        ));
    }

    #[test]
    fn test_startup_config_with_tab() {
        let cli = Cli::parse_from(["disasterwatch", "--tab", "sos"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.initial_tab, Tab::Sos);
    }

    #[test]
    fn test_apply_overrides() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let mut config = AppConfig::load_with_prefix(Some(file.path()), "DW_TEST_CLI").unwrap();

        let cli = Cli::parse_from([
            "disasterwatch",
            "--lat",
            "48.85",
            "--lon",
            "2.35",
            "--endpoint",
            "https://functions.test",
        ]);
        StartupConfig::from_cli(&cli).unwrap().apply(&mut config);

        assert_eq!(config.location.provider, ProviderKind::Fixed);
        assert_eq!(config.fixed_coordinate(), Some(Coordinate::new(48.85, 2.35)));
        assert_eq!(config.weather_endpoint().url, "https://functions.test/get-weather");

        let cli = Cli::parse_from(["disasterwatch", "--no-location"]);
        StartupConfig::from_cli(&cli).unwrap().apply(&mut config);
        assert_eq!(config.location.provider, ProviderKind::None);
    }
}
