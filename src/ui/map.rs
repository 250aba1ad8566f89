//! Map screen rendering
//!
//! A terminal has no tile map, so nearby places are listed with their kind and
//! great-circle distance from the last resolved position.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::colors;
use crate::app::App;
use crate::data::PlaceKind;

/// Color for a place kind
fn kind_color(kind: PlaceKind) -> Color {
    match kind {
        PlaceKind::Shelter => colors::SAFE,
        PlaceKind::Hospital => colors::HEADER,
        PlaceKind::Police => Color::Blue,
        PlaceKind::Danger => colors::DANGER,
    }
}

fn filter_label(filter: Option<PlaceKind>) -> &'static str {
    filter.map_or("All", |kind| kind.label())
}

/// Renders the place list into `area`
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(4)])
        .split(area);

    let origin = app.map_origin();
    let places = app.visible_places();

    let mut lines: Vec<Line> = Vec::with_capacity(places.len());
    for (i, place) in places.iter().enumerate() {
        let selected = i == app.map_selected;
        let marker = if selected { "▶ " } else { "  " };
        let name_style = if selected {
            Style::default().fg(colors::KEY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::PRIMARY)
        };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(colors::KEY)),
            Span::styled(
                format!("{:<12}", place.kind.label()),
                Style::default().fg(kind_color(place.kind)),
            ),
            Span::styled(format!("{:<28}", place.name), name_style),
            Span::styled(
                format!("{:>6.1} km", origin.distance_km(&place.coordinate())),
                Style::default().fg(colors::SECONDARY),
            ),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No places match this filter",
            Style::default().fg(colors::MUTED),
        )));
    }

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::HEADER))
            .title(format!(" Nearby Places [{}] ", filter_label(app.map_filter))),
    );
    frame.render_widget(list, chunks[0]);

    let detail = match places.get(app.map_selected) {
        Some(place) => vec![
            Line::from(Span::styled(
                place.name,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                place.coordinate().display(),
                Style::default().fg(colors::SECONDARY),
            )),
        ],
        None => vec![],
    };
    frame.render_widget(
        Paragraph::new(detail).block(Block::default().borders(Borders::ALL).title(" Selected ")),
        chunks[1],
    );
}
