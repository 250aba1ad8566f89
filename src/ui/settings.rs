//! Settings screen rendering

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::colors;
use crate::app::App;
use crate::settings::Toggle;

/// Renders the toggle list, grouped by section, into `area`
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    let mut section = "";

    for (i, toggle) in Toggle::ALL.iter().enumerate() {
        if toggle.section() != section {
            section = toggle.section();
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                section.to_uppercase(),
                Style::default().fg(colors::SECONDARY).add_modifier(Modifier::BOLD),
            )));
        }

        let on = app.settings.get(*toggle);
        let selected = i == app.settings_selected;
        let mut spans = vec![
            Span::styled(if selected { "▶ " } else { "  " }, Style::default().fg(colors::KEY)),
            Span::styled(
                if on { "[on]  " } else { "[off] " },
                Style::default().fg(if on { colors::SAFE } else { colors::MUTED }),
            ),
            Span::styled(toggle.label(), Style::default().fg(colors::PRIMARY)),
        ];
        if let Some(description) = toggle.description() {
            spans.push(Span::styled(
                format!("  {}", description),
                Style::default().fg(colors::MUTED),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Emergency number: ", Style::default().fg(colors::SECONDARY)),
        Span::raw(app.emergency_number.clone()),
        Span::styled("   Emergency contacts: ", Style::default().fg(colors::SECONDARY)),
        Span::raw(app.emergency_contacts.to_string()),
    ]));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::HEADER))
            .title(" Settings "),
    );
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Tab;
    use crate::testing::test_app;
    use crate::ui::render_to_string;

    #[tokio::test]
    async fn test_renders_sections_and_values() {
        let mut app = test_app();
        app.set_tab(Tab::Settings);
        let content = render_to_string(&app, 100, 30);

        assert!(content.contains("NOTIFICATIONS"));
        assert!(content.contains("PRIVACY & LOCATION"));
        assert!(content.contains("[on]  Location Services  Required for SOS"));
        assert!(content.contains("[off] Offline Mode"));
        assert!(content.contains("Emergency contacts: 3"));
    }

    #[tokio::test]
    async fn test_toggled_value_rendered() {
        let mut app = test_app();
        app.set_tab(Tab::Settings);
        app.settings.toggle(Toggle::LocationServices);
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("[off] Location Services"));
    }
}
