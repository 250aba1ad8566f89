//! Alerts screen rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::colors;
use crate::app::App;
use crate::data::NoticeKind;

fn kind_color(kind: NoticeKind) -> Color {
    match kind {
        NoticeKind::Danger => colors::DANGER,
        NoticeKind::Warning => colors::WARNING,
        NoticeKind::Info => colors::HEADER,
    }
}

/// Renders the notice feed into `area`
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let notices = app.visible_notices();
    let mut lines = Vec::with_capacity(notices.len() * 3);

    for (i, notice) in notices.iter().enumerate() {
        let selected = i == app.notice_selected;
        let mut title_style = Style::default().fg(kind_color(notice.kind));
        if !notice.read {
            title_style = title_style.add_modifier(Modifier::BOLD);
        }

        lines.push(Line::from(vec![
            Span::styled(if selected { "▶ " } else { "  " }, Style::default().fg(colors::KEY)),
            Span::styled(if notice.read { "  " } else { "● " }, Style::default().fg(colors::DANGER)),
            Span::styled(notice.title, title_style),
            Span::styled(format!("  {}", notice.age), Style::default().fg(colors::MUTED)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", notice.message),
            Style::default().fg(colors::SECONDARY),
        )));
        lines.push(Line::from(""));
    }

    if notices.is_empty() {
        lines.push(Line::from(Span::styled(
            "No unread alerts",
            Style::default().fg(colors::MUTED),
        )));
    }

    let title = if app.unread_only {
        format!(" Alerts (unread only, {} unread) ", app.unread_count())
    } else {
        format!(" Alerts ({} unread) ", app.unread_count())
    };

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::HEADER))
            .title(title),
    );
    frame.render_widget(paragraph, area);
}
