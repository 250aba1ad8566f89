//! UI rendering module for Disaster Watch
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. [`render`] draws the header, the
//! active screen, the key hint footer and, when open, the help overlay.

pub mod alerts;
pub mod dashboard;
pub mod help_overlay;
pub mod map;
pub mod nav;
pub mod settings;
pub mod sos;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, Tab};

pub use help_overlay::render as render_help_overlay;

/// Shared color scheme
pub mod colors {
    use ratatui::style::Color;

    use crate::risk::Variant;

    /// Safe/good status (green)
    pub const SAFE: Color = Color::Green;
    /// Advisory/warning status (yellow)
    pub const WARNING: Color = Color::Yellow;
    /// Danger status (red)
    pub const DANGER: Color = Color::Red;
    /// Section headers
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    /// Hints and placeholders
    pub const MUTED: Color = Color::DarkGray;
    /// Key labels
    pub const KEY: Color = Color::Yellow;

    /// Color of a status card variant
    pub fn variant(variant: Variant) -> Color {
        match variant {
            Variant::Success => SAFE,
            Variant::Warning => WARNING,
            Variant::Danger => DANGER,
        }
    }
}

/// Renders the whole screen for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with tabs
            Constraint::Min(5),    // Active screen
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    nav::render_header(frame, app, chunks[0]);

    match app.tab {
        Tab::Dashboard => dashboard::render(frame, app, chunks[1]),
        Tab::Map => map::render(frame, app, chunks[1]),
        Tab::Sos => sos::render(frame, app, chunks[1]),
        Tab::Alerts => alerts::render(frame, app, chunks[1]),
        Tab::Settings => settings::render(frame, app, chunks[1]),
    }

    nav::render_footer(frame, app, chunks[2]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

#[cfg(test)]
pub(crate) fn render_to_string(app: &App, width: u16, height: u16) -> String {
    use ratatui::{backend::TestBackend, Terminal};

    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| render(frame, app)).unwrap();

    let buffer = terminal.backend().buffer();
    buffer.content().iter().map(|cell| cell.symbol()).collect()
}
