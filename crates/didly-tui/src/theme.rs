//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

use didly_core::{HealthStatus, NotificationLevel};

// ── Palette ───────────────────────────────────────────────────────────

pub const ACCENT: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Semantic styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

/// Form label; highlighted when its field has focus.
pub fn field_label(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DIM_WHITE)
    }
}

pub fn field_value(focused: bool) -> Style {
    if focused {
        Style::default().fg(CYAN).bg(BG_HIGHLIGHT)
    } else {
        Style::default().fg(CYAN)
    }
}

/// Disabled form section (capability missing).
pub fn disabled() -> Style {
    Style::default()
        .fg(BORDER_GRAY)
        .add_modifier(Modifier::DIM)
}

/// Dot and color for the status bar health indicator.
pub fn health(status: HealthStatus) -> (&'static str, Style) {
    match status {
        HealthStatus::Online => ("●", Style::default().fg(GREEN)),
        HealthStatus::Offline => ("○", Style::default().fg(RED)),
        HealthStatus::Checking => ("◐", Style::default().fg(YELLOW)),
    }
}

pub fn notification(level: NotificationLevel) -> Style {
    let color = match level {
        NotificationLevel::Success => GREEN,
        NotificationLevel::Error => RED,
        NotificationLevel::Info => BLUE,
    };
    Style::default().fg(color).bg(BG_DARK)
}
