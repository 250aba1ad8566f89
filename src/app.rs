//! Application state management for Disaster Watch
//!
//! This module contains the main application state: the active tab, per-screen
//! selection state, the two flow controllers and the channels their background
//! tasks report on. Keyboard input is mapped onto controller operations here.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cli::StartupConfig;
use crate::data::places::{places_of_kind, REFERENCE_POINT};
use crate::data::{
    all_notices, AlertClient, HttpAlertClient, HttpWeatherClient, Notice, Place, PlaceKind,
    WeatherClient,
};
use crate::location::{
    Coordinate, FixedLocation, IpLocator, LocationProvider, NoLocation, PermissionGate,
    PositionOptions,
};
use crate::settings::{AppConfig, ProviderKind, Settings, Toggle};
use crate::sos::{SosConfig, SosController, SosEvent, SosPhase};
use crate::weather::{WeatherController, WeatherEvent};

/// Top-level screens, in navigation order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Dashboard,
    Map,
    Sos,
    Alerts,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Dashboard, Tab::Map, Tab::Sos, Tab::Alerts, Tab::Settings];

    /// Parses a tab name, case-insensitively
    pub fn from_name(name: &str) -> Option<Tab> {
        match name.to_lowercase().as_str() {
            "dashboard" | "home" => Some(Tab::Dashboard),
            "map" => Some(Tab::Map),
            "sos" => Some(Tab::Sos),
            "alerts" => Some(Tab::Alerts),
            "settings" => Some(Tab::Settings),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Home",
            Tab::Map => "Map",
            Tab::Sos => "SOS",
            Tab::Alerts => "Alerts",
            Tab::Settings => "Settings",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Next map filter in the cycle All -> Shelter -> Hospital -> Police -> Danger -> All
pub fn next_map_filter(filter: Option<PlaceKind>) -> Option<PlaceKind> {
    match filter {
        None => Some(PlaceKind::Shelter),
        Some(PlaceKind::Shelter) => Some(PlaceKind::Hospital),
        Some(PlaceKind::Hospital) => Some(PlaceKind::Police),
        Some(PlaceKind::Police) => Some(PlaceKind::Danger),
        Some(PlaceKind::Danger) => None,
    }
}

/// Injected platform services
#[derive(Clone)]
pub struct Services {
    pub location: Arc<dyn LocationProvider>,
    pub weather: Arc<dyn WeatherClient>,
    pub alerts: Arc<dyn AlertClient>,
}

impl Services {
    /// HTTP clients and the configured location provider behind the permission gate
    pub fn from_config(config: &AppConfig, location_enabled: Arc<AtomicBool>) -> Self {
        let fixed = config.fixed_coordinate();
        let provider: Arc<dyn LocationProvider> = match (config.location.provider, fixed) {
            (ProviderKind::Ip, _) => Arc::new(IpLocator::new(config.location.lookup_url.clone())),
            (ProviderKind::Fixed, Some(coordinate)) => Arc::new(FixedLocation(coordinate)),
            (ProviderKind::Fixed, None) | (ProviderKind::None, _) => Arc::new(NoLocation),
        };

        Self {
            location: Arc::new(PermissionGate::new(provider, location_enabled)),
            weather: Arc::new(HttpWeatherClient::new(config.weather_endpoint())),
            alerts: Arc::new(HttpAlertClient::new(config.sos_endpoint())),
        }
    }
}

/// Tunables the App needs at construction
#[derive(Debug, Clone, PartialEq)]
pub struct AppOptions {
    pub initial_tab: Tab,
    pub sos: SosConfig,
    pub weather_position: PositionOptions,
    pub emergency_number: String,
    pub emergency_contacts: u32,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            initial_tab: Tab::Dashboard,
            sos: SosConfig::default(),
            weather_position: PositionOptions {
                high_accuracy: false,
                ..PositionOptions::default()
            },
            emergency_number: "911".to_string(),
            emergency_contacts: 3,
        }
    }
}

impl AppOptions {
    /// Combines the loaded configuration with the CLI startup flags
    pub fn from_config(config: &AppConfig, startup: &StartupConfig) -> Self {
        Self {
            initial_tab: startup.initial_tab,
            sos: config.sos_config(),
            weather_position: config.weather_position_options(),
            emergency_number: config.sos.emergency_number.clone(),
            emergency_contacts: config.sos.emergency_contacts,
        }
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Currently visible screen
    pub tab: Tab,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Whether the dashboard warning banner was dismissed
    pub banner_dismissed: bool,
    /// Map type filter, `None` for all
    pub map_filter: Option<PlaceKind>,
    pub map_selected: usize,
    /// Notice feed with read state
    pub notices: Vec<Notice>,
    pub notice_selected: usize,
    /// Show only unread notices
    pub unread_only: bool,
    pub settings: Settings,
    pub settings_selected: usize,
    pub emergency_number: String,
    pub emergency_contacts: u32,
    pub weather: WeatherController,
    pub sos: SosController,
    weather_rx: mpsc::UnboundedReceiver<WeatherEvent>,
    sos_rx: mpsc::UnboundedReceiver<SosEvent>,
}

impl App {
    /// Creates the App; no background work starts until [`App::start`]
    pub fn new(services: Services, settings: Settings, options: AppOptions) -> Self {
        let (weather_tx, weather_rx) = mpsc::unbounded_channel();
        let (sos_tx, sos_rx) = mpsc::unbounded_channel();

        Self {
            tab: options.initial_tab,
            should_quit: false,
            show_help: false,
            banner_dismissed: false,
            map_filter: None,
            map_selected: 0,
            notices: all_notices(),
            notice_selected: 0,
            unread_only: false,
            settings,
            settings_selected: 0,
            emergency_number: options.emergency_number,
            emergency_contacts: options.emergency_contacts,
            weather: WeatherController::new(
                options.weather_position,
                Arc::clone(&services.location),
                services.weather,
                weather_tx,
            ),
            sos: SosController::new(options.sos, services.location, services.alerts, sos_tx),
            weather_rx,
            sos_rx,
        }
    }

    /// Kicks off the first weather fetch
    pub fn start(&mut self) {
        self.weather.start();
    }

    /// Applies every pending controller event. Returns whether any was applied.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.weather_rx.try_recv() {
            self.weather.handle_event(event);
            changed = true;
        }
        while let Ok(event) = self.sos_rx.try_recv() {
            self.sos.handle_event(event);
            changed = true;
        }
        changed
    }

    /// Waits for the next controller event and applies it
    ///
    /// Returns `false` if both channels are closed.
    pub async fn next_event(&mut self) -> bool {
        tokio::select! {
            Some(event) = self.weather_rx.recv() => {
                self.weather.handle_event(event);
                true
            }
            Some(event) = self.sos_rx.recv() => {
                self.sos.handle_event(event);
                true
            }
            else => false,
        }
    }

    /// Switches screens; leaving the SOS screen discards its session
    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        if self.tab == Tab::Sos {
            self.sos.discard();
        }
        debug!(from = ?self.tab, to = ?tab, "tab change");
        self.tab = tab;
    }

    pub fn unread_count(&self) -> usize {
        self.notices.iter().filter(|n| !n.read).count()
    }

    /// Notices shown under the current filter
    pub fn visible_notices(&self) -> Vec<&Notice> {
        self.notices
            .iter()
            .filter(|n| !self.unread_only || !n.read)
            .collect()
    }

    /// Places shown under the current filter
    pub fn visible_places(&self) -> Vec<&'static Place> {
        places_of_kind(self.map_filter)
    }

    /// Point map distances are measured from
    pub fn map_origin(&self) -> Coordinate {
        self.weather.coordinate().unwrap_or(REFERENCE_POINT)
    }

    /// Handles keyboard input events
    ///
    /// Global keys:
    /// - `1`-`5`, `Tab`/`BackTab`: switch screens
    /// - `!`: jump to alerts
    /// - `?`: toggle help, `q`: quit
    ///
    /// Screen keys are listed in the help overlay.
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            KeyCode::Char('!') => {
                self.set_tab(Tab::Alerts);
                return;
            }
            KeyCode::Tab => {
                self.set_tab(self.tab.next());
                return;
            }
            KeyCode::BackTab => {
                self.set_tab(self.tab.previous());
                return;
            }
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.set_tab(Tab::ALL[index]);
                return;
            }
            _ => {}
        }

        match self.tab {
            Tab::Dashboard => match key_event.code {
                KeyCode::Char('r') => {
                    self.weather.refresh();
                }
                KeyCode::Char('x') => {
                    self.banner_dismissed = true;
                }
                KeyCode::Char('e') => self.set_tab(Tab::Sos),
                KeyCode::Char('m') => self.set_tab(Tab::Map),
                _ => {}
            },
            Tab::Map => match key_event.code {
                KeyCode::Char('f') => {
                    self.map_filter = next_map_filter(self.map_filter);
                    self.map_selected = 0;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    let count = self.visible_places().len();
                    self.map_selected = wrap_up(self.map_selected, count);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let count = self.visible_places().len();
                    self.map_selected = wrap_down(self.map_selected, count);
                }
                _ => {}
            },
            Tab::Sos => match key_event.code {
                KeyCode::Enter => match self.sos.phase() {
                    SosPhase::Idle => {
                        self.sos.activate();
                    }
                    SosPhase::Sent(_) => {
                        self.sos.reset();
                    }
                    _ => {}
                },
                KeyCode::Char('h') => {
                    self.sos.reset();
                }
                KeyCode::Char('c') | KeyCode::Esc => {
                    self.sos.cancel();
                }
                KeyCode::Char('s') => {
                    self.sos.share_location();
                }
                _ => {}
            },
            Tab::Alerts => match key_event.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    let count = self.visible_notices().len();
                    self.notice_selected = wrap_up(self.notice_selected, count);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let count = self.visible_notices().len();
                    self.notice_selected = wrap_down(self.notice_selected, count);
                }
                KeyCode::Enter => self.mark_selected_read(),
                KeyCode::Char('a') => {
                    for notice in &mut self.notices {
                        notice.read = true;
                    }
                    self.clamp_notice_selection();
                }
                KeyCode::Char('u') => {
                    self.unread_only = !self.unread_only;
                    self.notice_selected = 0;
                }
                _ => {}
            },
            Tab::Settings => match key_event.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.settings_selected = wrap_up(self.settings_selected, Toggle::ALL.len());
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.settings_selected = wrap_down(self.settings_selected, Toggle::ALL.len());
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let toggle = Toggle::ALL[self.settings_selected];
                    let value = self.settings.toggle(toggle);
                    debug!(?toggle, value, "setting toggled");
                }
                _ => {}
            },
        }
    }

    fn mark_selected_read(&mut self) {
        let id = match self.visible_notices().get(self.notice_selected) {
            Some(notice) => notice.id,
            None => return,
        };
        if let Some(notice) = self.notices.iter_mut().find(|n| n.id == id) {
            notice.read = true;
        }
        self.clamp_notice_selection();
    }

    /// Keeps the selection inside the filtered list after it shrinks
    fn clamp_notice_selection(&mut self) {
        let count = self.visible_notices().len();
        if self.notice_selected >= count {
            self.notice_selected = count.saturating_sub(1);
        }
    }
}

/// Moves a selection up, wrapping to the bottom
fn wrap_up(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else if index == 0 {
        count - 1
    } else {
        index - 1
    }
}

/// Moves a selection down, wrapping to the top
fn wrap_down(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (index + 1) % count
    }
}
