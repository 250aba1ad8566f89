//! Header tab bar and key hint footer

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::colors;
use crate::app::{App, Tab};
use crate::sos::SosPhase;

/// Renders the application title, tab bar and unread alert counter
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let unread = app.unread_count();
    let badge = if unread > 0 {
        Span::styled(
            format!(" {} unread ", unread),
            Style::default().fg(colors::DANGER).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(" all read ", Style::default().fg(colors::MUTED))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            " Disaster Watch ",
            Style::default().fg(colors::PRIMARY).add_modifier(Modifier::BOLD),
        ))
        .title_top(Line::from(badge).right_aligned());

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(block)
        .select(app.tab.index())
        .style(Style::default().fg(colors::SECONDARY))
        .highlight_style(Style::default().fg(colors::KEY).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

/// Key hints for the active screen
fn hints(app: &App) -> &'static str {
    match app.tab {
        Tab::Dashboard => "r refresh  x dismiss  e emergency  m shelters  ? help  q quit",
        Tab::Map => "f filter  j/k select  ? help  q quit",
        Tab::Sos => match app.sos.phase() {
            SosPhase::Idle => "Enter send SOS  s share location  ? help  q quit",
            SosPhase::Armed => "c/Esc cancel",
            SosPhase::Sending => "sending...",
            SosPhase::Sent(_) => "Enter/h return home",
        },
        Tab::Alerts => "j/k select  Enter mark read  a mark all  u unread only  ? help",
        Tab::Settings => "j/k select  Enter/Space toggle  ? help  q quit",
    }
}

/// Renders the single-line key hint footer
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(" {}", hints(app)),
        Style::default().fg(colors::MUTED),
    )));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_app;
    use crate::ui::render_to_string;

    #[tokio::test]
    async fn test_header_shows_tabs_and_unread_count() {
        let app = test_app();
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("Disaster Watch"));
        assert!(content.contains("1 Home"));
        assert!(content.contains("5 Settings"));
        assert!(content.contains("2 unread"));
    }

    #[tokio::test]
    async fn test_header_all_read() {
        let mut app = test_app();
        for notice in &mut app.notices {
            notice.read = true;
        }
        let content = render_to_string(&app, 100, 30);
        assert!(content.contains("all read"));
    }

    #[tokio::test]
    async fn test_footer_follows_sos_phase() {
        let mut app = test_app();
        app.set_tab(Tab::Sos);
        assert!(hints(&app).contains("send SOS"));

        app.sos.activate();
        assert!(hints(&app).contains("cancel"));
    }
}
