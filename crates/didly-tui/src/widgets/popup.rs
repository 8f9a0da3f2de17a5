//! Centered overlays: the confirmation popup and the help screen.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::theme;

/// Rect of at most `width` x `height`, centered in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

/// Framed, cleared popup area; returns the inner rect.
pub fn frame_popup(frame: &mut Frame, rect: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    inner
}

pub fn render_confirm(frame: &mut Frame, area: Rect, prompt: &str) {
    let rect = centered(area, 60, 8);
    let inner = frame_popup(frame, rect, "Confirm");

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(prompt.to_owned(), Style::default().fg(theme::DIM_WHITE))),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", theme::key_hint_key()),
            Span::styled(" confirm   ", theme::key_hint()),
            Span::styled("n", theme::key_hint_key()),
            Span::styled(" cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

const HELP: &[(&str, &str)] = &[
    ("Tab", "Switch screen"),
    ("j/k ↑/↓", "Move selection"),
    ("/", "Edit filters"),
    ("Enter", "Search / buy / configure"),
    ("d", "Release selected number"),
    ("r", "Reload my numbers"),
    ("Esc", "Back / close"),
    ("?", "This help"),
    ("q", "Quit"),
];

pub fn render_help(frame: &mut Frame, area: Rect) {
    let height = u16::try_from(HELP.len()).unwrap_or(u16::MAX).saturating_add(4);
    let rect = centered(area, 50, height);
    let inner = frame_popup(frame, rect, "Keyboard Shortcuts");

    let mut lines = vec![Line::from("")];
    lines.extend(HELP.iter().map(|(key, what)| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(*what, theme::key_hint()),
        ])
    }));
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn centered_rect_fits_inside_small_areas() {
        let area = Rect::new(0, 0, 40, 6);
        let rect = centered(area, 60, 8);
        assert_eq!(rect, Rect::new(1, 1, 38, 4));
    }
}
