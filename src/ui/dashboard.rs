//! Dashboard screen rendering
//!
//! Shows the dismissable warning banner, the four status cards derived from the
//! current weather snapshot, weather details with the short forecast, quick
//! actions and safety tips.

use chrono::DateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::colors;
use crate::app::App;
use crate::data::WeatherSnapshot;
use crate::location::LocationSource;
use crate::risk::{assess, Variant};
use crate::weather::WeatherState;

const SAFETY_TIPS: [&str; 3] = [
    "Keep emergency supplies stocked and accessible",
    "Know your evacuation routes and shelter locations",
    "Stay connected with family and local authorities",
];

/// One status card: title, value and color
struct StatCard {
    title: &'static str,
    value: String,
    variant: Option<Variant>,
}

/// Builds the four status cards for the current weather state
fn stat_cards(state: &WeatherState) -> [StatCard; 4] {
    match state {
        WeatherState::Ready(snapshot) => {
            let risk = assess(snapshot);
            let alert_variant = if snapshot.alerts.is_empty() {
                Variant::Success
            } else {
                Variant::Danger
            };
            [
                StatCard {
                    title: "Risk Level",
                    value: risk.level.label().to_string(),
                    variant: Some(risk.variant),
                },
                StatCard {
                    title: "Active Alerts",
                    value: snapshot.alerts.len().to_string(),
                    variant: Some(alert_variant),
                },
                StatCard {
                    title: "Weather",
                    value: snapshot.current.condition_text.clone(),
                    variant: None,
                },
                StatCard {
                    title: "Wind Speed",
                    value: format!("{:.0} km/h", snapshot.current.wind_speed_kmh),
                    variant: None,
                },
            ]
        }
        _ => {
            let placeholder = if matches!(state, WeatherState::Loading) { "..." } else { "--" };
            ["Risk Level", "Active Alerts", "Weather", "Wind Speed"].map(|title| StatCard {
                title,
                value: placeholder.to_string(),
                variant: None,
            })
        }
    }
}

/// Renders the dashboard into `area`
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let banner_height = if app.banner_dismissed { 0 } else { 4 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Length(5), // Status cards
            Constraint::Min(6),    // Weather details
            Constraint::Length(5), // Quick actions + tips
        ])
        .split(area);

    if !app.banner_dismissed {
        render_banner(frame, chunks[0]);
    }
    render_status(frame, app.weather.state(), chunks[1]);
    render_weather(frame, app, chunks[2]);
    render_actions(frame, chunks[3]);
}

fn render_banner(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "⚠ Flash Flood Warning",
                Style::default().fg(colors::WARNING).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (x to dismiss)", Style::default().fg(colors::MUTED)),
        ]),
        Line::from(
            "Heavy rainfall expected in your area. Stay alert and be prepared to evacuate.",
        ),
    ];
    let banner = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::WARNING)),
        );
    frame.render_widget(banner, area);
}

fn render_status(frame: &mut Frame, state: &WeatherState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(" Current Status ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(inner);

    for (card, column) in stat_cards(state).iter().zip(columns.iter()) {
        let color = card.variant.map(colors::variant).unwrap_or(colors::PRIMARY);
        let lines = vec![
            Line::from(Span::styled(card.title, Style::default().fg(colors::SECONDARY))),
            Line::from(Span::styled(
                card.value.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), *column);
    }
}

fn render_weather(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(" Weather ");

    let lines = match app.weather.state() {
        WeatherState::Loading => vec![Line::from(Span::styled(
            "Loading weather data...",
            Style::default().fg(colors::HEADER),
        ))],
        WeatherState::Error(message) => vec![
            Line::from(Span::styled(
                format!("Unable to load weather: {}", message),
                Style::default().fg(colors::DANGER),
            )),
            Line::from(Span::styled("Press r to retry", Style::default().fg(colors::MUTED))),
        ],
        WeatherState::Ready(snapshot) => {
            weather_lines(snapshot, app.weather.location_source() == Some(LocationSource::Fallback))
        }
    };

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// Short weekday and day of month for an epoch timestamp
fn forecast_label(epoch: i64) -> String {
    DateTime::from_timestamp(epoch, 0)
        .map(|d| d.format("%a %d").to_string())
        .unwrap_or_else(|| "--".to_string())
}

fn forecast_temp(temp: Option<f64>) -> String {
    temp.map(|t| format!("{:.0}", t))
        .unwrap_or_else(|| "--".to_string())
}

fn weather_lines(snapshot: &WeatherSnapshot, fallback: bool) -> Vec<Line<'static>> {
    let current = &snapshot.current;
    let mut place = format!("{}, {}", current.location_name, current.country_code);
    if fallback {
        place.push_str(" (default location)");
    }

    let mut lines = vec![
        Line::from(vec![
            Span::styled(place, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "  {:.0}°C (feels {:.0}°C)  {}",
                current.temperature, current.feels_like, current.description
            )),
        ]),
        Line::from(Span::styled(
            format!(
                "Humidity {:.0}%  Pressure {:.0} hPa  Visibility {:.1} km  Clouds {:.0}%",
                current.humidity, current.pressure, current.visibility_km, current.clouds_pct
            ),
            Style::default().fg(colors::SECONDARY),
        )),
    ];

    for alert in &snapshot.alerts {
        lines.push(Line::from(vec![
            Span::styled("▲ ", Style::default().fg(colors::DANGER)),
            Span::styled(
                alert.event.clone(),
                Style::default().fg(colors::DANGER).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", alert.sender), Style::default().fg(colors::MUTED)),
        ]));
    }

    if !snapshot.forecast.is_empty() {
        let days: Vec<Span> = snapshot
            .forecast
            .iter()
            .map(|day| {
                Span::raw(format!(
                    "{} {}/{}°C {}   ",
                    forecast_label(day.date_epoch),
                    forecast_temp(day.temp_min),
                    forecast_temp(day.temp_max),
                    day.condition_text
                ))
            })
            .collect();
        lines.push(Line::from(days));
    }

    lines
}

fn render_actions(frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let actions = vec![
        Line::from(vec![
            Span::styled("e ", Style::default().fg(colors::KEY)),
            Span::styled("Emergency", Style::default().fg(colors::DANGER)),
        ]),
        Line::from(vec![
            Span::styled("m ", Style::default().fg(colors::KEY)),
            Span::styled("Shelters", Style::default().fg(colors::SAFE)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(actions).block(Block::default().borders(Borders::ALL).title(" Quick Actions ")),
        columns[0],
    );

    let tips: Vec<Line> = SAFETY_TIPS
        .iter()
        .map(|tip| Line::from(format!("• {}", tip)))
        .collect();
    frame.render_widget(
        Paragraph::new(tips)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Safety Tips ")),
        columns[1],
    );
}
