//! SOS flow controller
//!
//! Owns the `Idle -> Armed -> Sending -> Sent` state machine of an emergency alert.
//! Arming starts a one-second ticker task; when the countdown reaches zero the ticker is
//! stopped and the send sequence (locate, then submit) runs exactly once. Completions come
//! back as [`SosEvent`]s on a channel that the application loop drains into
//! [`SosController::handle_event`].
//!
//! A failed location lookup or submission still ends in `Sent`, flagged as degraded, so the
//! user always lands on a screen with a next action (call the emergency number).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use crate::data::{AlertClient, AlertSubmission, DeviceInfo, RemoteError, SubmissionReceipt};
use crate::location::{Coordinate, LocationError, LocationProvider, PositionOptions};

/// Seconds between arming and sending
pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;

/// Countdown cadence
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How the send sequence ended
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The submission function accepted the alert
    Confirmed { message: Option<String> },
    /// The alert could not be confirmed; the user must be offered a direct call
    Degraded { reason: String },
}

impl SendOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SendOutcome::Degraded { .. })
    }
}

/// Phase of an SOS session
#[derive(Debug, Clone, PartialEq)]
pub enum SosPhase {
    Idle,
    Armed,
    Sending,
    Sent(SendOutcome),
}

/// Per-activation state, mutated only by [`SosController`]
#[derive(Debug, Clone, PartialEq)]
pub struct SosSession {
    pub phase: SosPhase,
    /// Seconds left while armed; never increases while armed
    pub countdown: u32,
    /// Position submitted with the alert, if one was obtained
    pub captured_location: Option<Coordinate>,
    /// Send sequences started in this session (0 or 1)
    pub send_attempts: u32,
}

impl SosSession {
    fn idle(countdown: u32) -> Self {
        Self {
            phase: SosPhase::Idle,
            countdown,
            captured_location: None,
            send_attempts: 0,
        }
    }
}

/// State of the independent "share my location" action
#[derive(Debug, Clone, PartialEq)]
pub enum ShareStatus {
    Idle,
    Sending,
    Shared { coordinate: Coordinate },
    Failed { message: String },
}

/// Everything the send sequence learned
#[derive(Debug)]
pub struct SendReport {
    pub coordinate: Option<Coordinate>,
    pub location_error: Option<LocationError>,
    pub result: Result<SubmissionReceipt, RemoteError>,
}

impl SendReport {
    /// Collapses the report into the user-facing outcome
    pub fn outcome(&self) -> SendOutcome {
        match (&self.location_error, &self.result) {
            (None, Ok(receipt)) => SendOutcome::Confirmed {
                message: receipt.message.clone(),
            },
            (Some(location_error), Ok(_)) => SendOutcome::Degraded {
                reason: format!("alert sent without location ({})", location_error),
            },
            (_, Err(e)) => SendOutcome::Degraded {
                reason: format!("alert not confirmed: {}", e),
            },
        }
    }
}

/// Messages from the ticker and background tasks
#[derive(Debug)]
pub enum SosEvent {
    Tick { generation: u64 },
    SendCompleted { generation: u64, report: SendReport },
    ShareCompleted { result: Result<Coordinate, String> },
}

/// Tunables of the SOS flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SosConfig {
    pub countdown_secs: u32,
    pub tick_interval: Duration,
    pub location_timeout: Duration,
}

impl Default for SosConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            tick_interval: TICK_INTERVAL,
            location_timeout: Duration::from_secs(10),
        }
    }
}

/// Acquires a position and submits the alert; never fails
///
/// A location failure does not stop the submission: the alert goes out with null
/// coordinates.
pub async fn run_send_sequence(
    location: &dyn LocationProvider,
    alerts: &dyn AlertClient,
    location_timeout: Duration,
    device: DeviceInfo,
) -> SendReport {
    let options = PositionOptions {
        high_accuracy: true,
        timeout: location_timeout,
    };

    let (coordinate, location_error) = match location.current_position(options).await {
        Ok(c) => (Some(c), None),
        Err(e) => {
            warn!(error = %e, "SOS location unavailable, sending without coordinates");
            (None, Some(e))
        }
    };

    let submission = AlertSubmission::sos(coordinate, Utc::now(), device);
    let result = alerts.submit(&submission).await;
    if let Err(e) = &result {
        warn!(error = %e, "SOS submission failed");
    }

    SendReport {
        coordinate,
        location_error,
        result,
    }
}

/// Drives one SOS session at a time plus the location-share action
pub struct SosController {
    session: SosSession,
    share: ShareStatus,
    /// Bumped whenever a session is abandoned so its late ticks and completions are ignored
    generation: u64,
    ticker: Option<JoinHandle<()>>,
    config: SosConfig,
    location: Arc<dyn LocationProvider>,
    alerts: Arc<dyn AlertClient>,
    events: mpsc::UnboundedSender<SosEvent>,
}

impl SosController {
    pub fn new(
        config: SosConfig,
        location: Arc<dyn LocationProvider>,
        alerts: Arc<dyn AlertClient>,
        events: mpsc::UnboundedSender<SosEvent>,
    ) -> Self {
        Self {
            session: SosSession::idle(config.countdown_secs),
            share: ShareStatus::Idle,
            generation: 0,
            ticker: None,
            config,
            location,
            alerts,
            events,
        }
    }

    pub fn session(&self) -> &SosSession {
        &self.session
    }

    pub fn phase(&self) -> &SosPhase {
        &self.session.phase
    }

    pub fn share_status(&self) -> &ShareStatus {
        &self.share
    }

    pub fn config(&self) -> &SosConfig {
        &self.config
    }

    /// Idle -> Armed; starts the countdown. Returns whether anything happened.
    pub fn activate(&mut self) -> bool {
        if self.session.phase != SosPhase::Idle {
            debug!(phase = ?self.session.phase, "activate ignored");
            return false;
        }

        self.session.phase = SosPhase::Armed;
        self.session.countdown = self.config.countdown_secs;
        info!(countdown = self.session.countdown, "SOS armed");
        self.start_ticker();
        true
    }

    /// Armed -> Idle; the send never starts. Returns whether anything happened.
    pub fn cancel(&mut self) -> bool {
        if self.session.phase != SosPhase::Armed {
            debug!(phase = ?self.session.phase, "cancel ignored");
            return false;
        }

        self.abandon();
        info!("SOS cancelled");
        true
    }

    /// Sent -> Idle. Returns whether anything happened.
    pub fn reset(&mut self) -> bool {
        if !matches!(self.session.phase, SosPhase::Sent(_)) {
            debug!(phase = ?self.session.phase, "reset ignored");
            return false;
        }

        self.abandon();
        info!("SOS session reset");
        true
    }

    /// Drops the session from any phase, e.g. when the SOS screen is left
    ///
    /// An in-flight send keeps running, but its completion is ignored.
    pub fn discard(&mut self) {
        if self.session.phase != SosPhase::Idle {
            info!(phase = ?self.session.phase, "SOS session discarded");
        }
        self.abandon();
    }

    /// Starts a one-shot location share. Only allowed from Idle with no share in flight.
    pub fn share_location(&mut self) -> bool {
        if self.session.phase != SosPhase::Idle || self.share == ShareStatus::Sending {
            debug!("share ignored");
            return false;
        }

        self.share = ShareStatus::Sending;
        let location = Arc::clone(&self.location);
        let alerts = Arc::clone(&self.alerts);
        let events = self.events.clone();
        let options = PositionOptions {
            high_accuracy: true,
            timeout: self.config.location_timeout,
        };

        tokio::spawn(async move {
            let result = match location.current_position(options).await {
                Ok(coordinate) => {
                    let submission = AlertSubmission::location_share(coordinate, Utc::now());
                    alerts
                        .submit(&submission)
                        .await
                        .map(|_| coordinate)
                        .map_err(|e| e.to_string())
                }
                Err(e) => Err(e.to_string()),
            };
            let _ = events.send(SosEvent::ShareCompleted { result });
        });
        true
    }

    /// Applies a message from the ticker or a background task
    pub fn handle_event(&mut self, event: SosEvent) {
        match event {
            SosEvent::Tick { generation } => self.on_tick(generation),
            SosEvent::SendCompleted { generation, report } => {
                if generation != self.generation || self.session.phase != SosPhase::Sending {
                    debug!(generation, "stale SOS completion dropped");
                    return;
                }

                let outcome = report.outcome();
                if outcome.is_degraded() {
                    warn!(?outcome, "SOS sent in degraded mode");
                } else {
                    info!("SOS delivered");
                }
                self.session.captured_location = report.coordinate;
                self.session.phase = SosPhase::Sent(outcome);
            }
            SosEvent::ShareCompleted { result } => {
                self.share = match result {
                    Ok(coordinate) => {
                        info!("location shared");
                        ShareStatus::Shared { coordinate }
                    }
                    Err(message) => {
                        warn!(%message, "location share failed");
                        ShareStatus::Failed { message }
                    }
                };
            }
        }
    }

    fn on_tick(&mut self, generation: u64) {
        if generation != self.generation || self.session.phase != SosPhase::Armed {
            debug!(generation, "stale tick dropped");
            return;
        }

        self.session.countdown = self.session.countdown.saturating_sub(1);
        debug!(countdown = self.session.countdown, "SOS countdown");
        if self.session.countdown == 0 {
            self.begin_send();
        }
    }

    fn begin_send(&mut self) {
        self.stop_ticker();
        self.session.phase = SosPhase::Sending;
        self.session.send_attempts += 1;
        info!("SOS sending");

        let location = Arc::clone(&self.location);
        let alerts = Arc::clone(&self.alerts);
        let events = self.events.clone();
        let generation = self.generation;
        let timeout = self.config.location_timeout;

        tokio::spawn(async move {
            let report =
                run_send_sequence(location.as_ref(), alerts.as_ref(), timeout, DeviceInfo::current())
                    .await;
            let _ = events.send(SosEvent::SendCompleted { generation, report });
        });
    }

    fn start_ticker(&mut self) {
        self.stop_ticker();
        let events = self.events.clone();
        let generation = self.generation;
        let period = self.config.tick_interval;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if events.send(SosEvent::Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    /// Back to a fresh Idle session under a new generation
    fn abandon(&mut self) {
        self.stop_ticker();
        self.generation += 1;
        self.session = SosSession::idle(self.config.countdown_secs);
    }
}

impl Drop for SosController {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
