//! Weather flow controller
//!
//! Resolves a position (falling back to the default coordinate), fetches a snapshot and keeps
//! the `Loading -> Ready | Error` state. Each fetch is tagged with a request id and only the
//! completion of the most recent request is applied.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::{RemoteError, WeatherClient, WeatherSnapshot};
use crate::location::{resolve_or_default, Coordinate, LocationProvider, LocationSource, PositionOptions};
use crate::risk::{assess, RiskAssessment};

/// What the weather screen shows
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherState {
    Loading,
    Ready(WeatherSnapshot),
    /// Human-readable failure; no stale snapshot is kept
    Error(String),
}

/// Completion of a background fetch
#[derive(Debug)]
pub enum WeatherEvent {
    Completed {
        request_id: u64,
        coordinate: Coordinate,
        source: LocationSource,
        result: Result<WeatherSnapshot, RemoteError>,
    },
}

/// Owns the single weather snapshot
pub struct WeatherController {
    state: WeatherState,
    started: bool,
    coordinate: Option<Coordinate>,
    source: Option<LocationSource>,
    /// Id of the most recently issued request
    latest_request: u64,
    location_options: PositionOptions,
    location: Arc<dyn LocationProvider>,
    client: Arc<dyn WeatherClient>,
    events: mpsc::UnboundedSender<WeatherEvent>,
}

impl WeatherController {
    pub fn new(
        location_options: PositionOptions,
        location: Arc<dyn LocationProvider>,
        client: Arc<dyn WeatherClient>,
        events: mpsc::UnboundedSender<WeatherEvent>,
    ) -> Self {
        Self {
            state: WeatherState::Loading,
            started: false,
            coordinate: None,
            source: None,
            latest_request: 0,
            location_options,
            location,
            client,
            events,
        }
    }

    pub fn state(&self) -> &WeatherState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == WeatherState::Loading
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match &self.state {
            WeatherState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Risk of the current snapshot, recomputed on every call
    pub fn risk(&self) -> Option<RiskAssessment> {
        self.snapshot().map(assess)
    }

    /// Last coordinate a fetch completed for
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn location_source(&self) -> Option<LocationSource> {
        self.source
    }

    /// First activation. Later calls do nothing; use [`WeatherController::refresh`].
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.refresh();
    }

    /// Re-enters Loading and issues a new fetch
    ///
    /// Re-uses the last resolved coordinate when there is one, otherwise asks the location
    /// provider again. Returns the id of the issued request.
    pub fn refresh(&mut self) -> u64 {
        self.started = true;
        self.latest_request += 1;
        let request_id = self.latest_request;
        self.state = WeatherState::Loading;

        let known = self.coordinate.zip(self.source);
        let location = Arc::clone(&self.location);
        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let options = self.location_options;

        info!(request_id, reuse_location = known.is_some(), "weather fetch issued");
        tokio::spawn(async move {
            let (coordinate, source) = match known {
                Some(known) => known,
                None => resolve_or_default(location.as_ref(), options).await,
            };
            let result = client.fetch_weather(coordinate).await;
            let _ = events.send(WeatherEvent::Completed {
                request_id,
                coordinate,
                source,
                result,
            });
        });

        request_id
    }

    /// Applies a fetch completion unless a newer request has been issued since
    pub fn handle_event(&mut self, event: WeatherEvent) {
        let WeatherEvent::Completed {
            request_id,
            coordinate,
            source,
            result,
        } = event;

        if request_id != self.latest_request {
            debug!(request_id, latest = self.latest_request, "stale weather response dropped");
            return;
        }

        self.coordinate = Some(coordinate);
        self.source = Some(source);
        self.state = match result {
            Ok(snapshot) => {
                info!(
                    request_id,
                    location = %snapshot.current.location_name,
                    alerts = snapshot.alerts.len(),
                    "weather ready"
                );
                WeatherState::Ready(snapshot)
            }
            Err(e) => {
                warn!(request_id, error = %e, "weather fetch failed");
                WeatherState::Error(e.to_string())
            }
        };
    }
}
