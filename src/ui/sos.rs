//! SOS screen rendering
//!
//! One view per session phase: the idle call-to-action, the armed countdown, the
//! sending spinner text and the sent confirmation. A degraded send replaces the
//! confirmation with an instruction to call the emergency number directly.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::colors;
use crate::app::App;
use crate::sos::{SendOutcome, ShareStatus, SosPhase};

/// Renders the SOS screen into `area`
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    let session = app.sos.session();
    let (lines, border) = match &session.phase {
        SosPhase::Idle => (idle_lines(app), colors::DANGER),
        SosPhase::Armed => (
            vec![
                Line::from(""),
                big(&session.countdown.to_string(), colors::DANGER),
                Line::from(""),
                big("Sending SOS in", colors::DANGER),
                Line::from(Span::styled("Press c to cancel", Style::default().fg(colors::MUTED))),
            ],
            colors::DANGER,
        ),
        SosPhase::Sending => (
            vec![
                Line::from(""),
                big("Sending SOS...", colors::DANGER),
                Line::from(Span::styled("Please stay calm", Style::default().fg(colors::MUTED))),
            ],
            colors::DANGER,
        ),
        SosPhase::Sent(outcome) => (sent_lines(app, outcome), sent_color(outcome)),
    };

    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" SOS "),
        );
    frame.render_widget(body, chunks[0]);

    render_share_status(frame, app.sos.share_status(), chunks[1]);
}

fn big(text: &str, color: ratatui::style::Color) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn idle_lines(app: &App) -> Vec<Line<'static>> {
    vec![
        big("Emergency SOS", colors::PRIMARY),
        Line::from(Span::styled(
            "Press Enter to send an emergency alert",
            Style::default().fg(colors::SECONDARY),
        )),
        Line::from(""),
        big("[ SOS ]", colors::DANGER),
        Line::from(""),
        Line::from(vec![
            Span::styled("Call ", Style::default().fg(colors::SECONDARY)),
            Span::styled(
                app.emergency_number.clone(),
                Style::default().fg(colors::DANGER).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   s ", Style::default().fg(colors::KEY)),
            Span::styled("Share My Location", Style::default().fg(colors::SECONDARY)),
        ]),
    ]
}

fn sent_color(outcome: &SendOutcome) -> ratatui::style::Color {
    if outcome.is_degraded() {
        colors::WARNING
    } else {
        colors::SAFE
    }
}

fn sent_lines(app: &App, outcome: &SendOutcome) -> Vec<Line<'static>> {
    let location = match app.sos.session().captured_location {
        Some(coordinate) => coordinate.display(),
        None => "Location unavailable".to_string(),
    };

    let mut lines = match outcome {
        SendOutcome::Confirmed { .. } => vec![
            big("✓ Help is on the way!", colors::SAFE),
            Line::from(Span::styled(
                "Emergency services have been notified",
                Style::default().fg(colors::SECONDARY),
            )),
        ],
        SendOutcome::Degraded { reason } => vec![
            big("SOS could not be confirmed", colors::WARNING),
            Line::from(vec![
                Span::raw("Please call "),
                Span::styled(
                    app.emergency_number.clone(),
                    Style::default().fg(colors::DANGER).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" directly"),
            ]),
            Line::from(Span::styled(reason.clone(), Style::default().fg(colors::MUTED))),
        ],
    };

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Location: ", Style::default().fg(colors::SECONDARY)),
        Span::raw(location),
    ]));
    if !outcome.is_degraded() {
        lines.push(Line::from(vec![
            Span::styled("Emergency contacts: ", Style::default().fg(colors::SECONDARY)),
            Span::raw(format!("{} contacts alerted", app.emergency_contacts)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to return home",
        Style::default().fg(colors::MUTED),
    )));
    lines
}

fn render_share_status(frame: &mut Frame, status: &ShareStatus, area: Rect) {
    let line = match status {
        ShareStatus::Idle => Line::from(Span::styled(
            "Location not shared",
            Style::default().fg(colors::MUTED),
        )),
        ShareStatus::Sending => Line::from(Span::styled(
            "Sharing...",
            Style::default().fg(colors::HEADER),
        )),
        ShareStatus::Shared { coordinate } => Line::from(Span::styled(
            format!("Location shared: {}", coordinate.display()),
            Style::default().fg(colors::SAFE),
        )),
        ShareStatus::Failed { message } => Line::from(Span::styled(
            format!("Failed to share location: {}", message),
            Style::default().fg(colors::DANGER),
        )),
    };
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Share ")),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Tab;
    use crate::data::{RemoteError, SubmissionReceipt};
    use crate::location::{Coordinate, LocationError};
    use crate::sos::{SendReport, SosEvent};
    use crate::testing::test_app;
    use crate::ui::render_to_string;

    fn sos_app() -> App {
        let mut app = test_app();
        app.set_tab(Tab::Sos);
        app
    }

    /// Drives the session to Sending with synthetic ticks
    fn arm_and_expire(app: &mut App) {
        app.sos.activate();
        for _ in 0..app.sos.config().countdown_secs {
            app.sos.handle_event(SosEvent::Tick { generation: 0 });
        }
    }

    #[tokio::test]
    async fn test_idle_shows_call_to_action() {
        let app = sos_app();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Emergency SOS"));
        assert!(content.contains("Call 911"));
        assert!(content.contains("Location not shared"));
    }

    #[tokio::test]
    async fn test_armed_shows_countdown() {
        let mut app = sos_app();
        app.sos.activate();
        app.sos.handle_event(SosEvent::Tick { generation: 0 });
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Sending SOS in"));
        assert!(content.contains("Press c to cancel"));
        assert!(!content.contains("Emergency SOS"));
    }

    #[tokio::test]
    async fn test_sending() {
        let mut app = sos_app();
        arm_and_expire(&mut app);
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Sending SOS..."));
    }

    #[tokio::test]
    async fn test_confirmed_sent_screen() {
        let mut app = sos_app();
        arm_and_expire(&mut app);
        app.sos.handle_event(SosEvent::SendCompleted {
            generation: 0,
            report: SendReport {
                coordinate: Some(Coordinate::new(19.076, 72.8777)),
                location_error: None,
                result: Ok(SubmissionReceipt {
                    message: None,
                    data: None,
                }),
            },
        });

        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Help is on the way!"));
        assert!(content.contains("19.0760° N, 72.8777° E"));
        assert!(content.contains("3 contacts alerted"));
    }

    #[tokio::test]
    async fn test_degraded_sent_screen_offers_call() {
        let mut app = sos_app();
        app.emergency_number = "112".to_string();
        arm_and_expire(&mut app);
        app.sos.handle_event(SosEvent::SendCompleted {
            generation: 0,
            report: SendReport {
                coordinate: None,
                location_error: Some(LocationError::PermissionDenied),
                result: Err(RemoteError::Rejected("offline".to_string())),
            },
        });

        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("SOS could not be confirmed"));
        assert!(content.contains("Please call 112 directly"));
        assert!(content.contains("Location unavailable"));
        assert!(!content.contains("Help is on the way"));
    }

    #[tokio::test]
    async fn test_share_failure_shown() {
        let mut app = sos_app();
        app.sos.handle_event(SosEvent::ShareCompleted {
            result: Err("position unavailable: location permission denied".to_string()),
        });
        let content = render_to_string(&app, 120, 30);
        assert!(content.contains("Failed to share location"));
    }
}
