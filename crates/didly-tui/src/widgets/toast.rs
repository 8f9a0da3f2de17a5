//! Auto-dismissing toast notifications, stacked bottom-right.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use didly_core::{Notification, NotificationLevel};

use crate::theme;

const TTL: Duration = Duration::from_secs(4);
const MAX_VISIBLE: usize = 3;
const WIDTH: u16 = 48;

#[derive(Debug)]
struct Toast {
    notification: Notification,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct Toasts {
    items: VecDeque<Toast>,
}

impl Toasts {
    pub fn push(&mut self, notification: Notification, now: Instant) {
        self.items.push_back(Toast {
            notification,
            expires_at: now + TTL,
        });
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    /// Drop everything past its deadline.
    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|t| t.expires_at > now);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn messages(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().map(|t| &t.notification)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() {
            return;
        }
        let width = WIDTH.min(area.width);
        let mut bottom = area.bottom();
        for toast in self.items.iter().rev() {
            let height = 3;
            if bottom < area.y + height {
                break;
            }
            bottom -= height;
            let rect = Rect::new(area.right().saturating_sub(width), bottom, width, height);

            let style = theme::notification(toast.notification.level);
            let icon = match toast.notification.level {
                NotificationLevel::Success => "✓",
                NotificationLevel::Error => "✗",
                NotificationLevel::Info => "ℹ",
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style);
            let text = Line::from(vec![
                Span::styled(format!("{icon} "), style),
                Span::styled(toast.notification.message.clone(), style),
            ]);
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
                rect,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn toasts_expire_after_ttl() {
        let start = Instant::now();
        let mut toasts = Toasts::default();
        toasts.push(Notification::success("Phone number purchased successfully!"), start);

        toasts.expire(start + Duration::from_secs(1));
        assert!(!toasts.is_empty());

        toasts.expire(start + TTL);
        assert!(toasts.is_empty());
    }

    #[test]
    fn oldest_toast_is_dropped_past_the_cap() {
        let now = Instant::now();
        let mut toasts = Toasts::default();
        for i in 0..4 {
            toasts.push(Notification::info(format!("n{i}")), now);
        }
        let messages: Vec<_> = toasts.messages().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["n1", "n2", "n3"]);
    }
}
