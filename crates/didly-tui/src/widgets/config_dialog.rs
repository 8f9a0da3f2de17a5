//! Configuration dialog for an owned number.
//!
//! The form itself lives in the workflow (`ConfigDialog::form`); this
//! widget only tracks which field has focus and turns keys into
//! `EditConfig` / `RequestSaveConfig` / `CloseConfig` events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use didly_core::workflow::ConfigDialog;
use didly_core::{Capabilities, ConfigForm, Event};

use crate::action::Action;
use crate::theme;
use crate::widgets::{input, popup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FriendlyName,
    VoiceEnabled,
    ForwardToSip,
    ForwardToWebhook,
    Voicemail,
    SmsEnabled,
    SmsWebhook,
    AutoReply,
    AutoReplyMessage,
}

const VOICE_FIELDS: [Field; 4] = [
    Field::VoiceEnabled,
    Field::ForwardToSip,
    Field::ForwardToWebhook,
    Field::Voicemail,
];
const SMS_FIELDS: [Field; 4] = [
    Field::SmsEnabled,
    Field::SmsWebhook,
    Field::AutoReply,
    Field::AutoReplyMessage,
];

impl Field {
    /// Editable fields in display order. Sections the number can't carry
    /// are left out.
    pub fn available(caps: Capabilities) -> Vec<Self> {
        let mut fields = vec![Self::FriendlyName];
        if caps.voice {
            fields.extend(VOICE_FIELDS);
        }
        if caps.sms {
            fields.extend(SMS_FIELDS);
        }
        fields
    }

    fn label(self) -> &'static str {
        match self {
            Self::FriendlyName => "Friendly name",
            Self::VoiceEnabled => "Voice enabled",
            Self::ForwardToSip => "Forward to SIP",
            Self::ForwardToWebhook => "Voice webhook",
            Self::Voicemail => "Voicemail",
            Self::SmsEnabled => "SMS enabled",
            Self::SmsWebhook => "SMS webhook",
            Self::AutoReply => "Auto-reply",
            Self::AutoReplyMessage => "Auto-reply text",
        }
    }

    fn toggle(self, form: &mut ConfigForm) -> Option<&mut bool> {
        match self {
            Self::VoiceEnabled => Some(&mut form.voice_enabled),
            Self::Voicemail => Some(&mut form.voicemail_enabled),
            Self::SmsEnabled => Some(&mut form.sms_enabled),
            Self::AutoReply => Some(&mut form.auto_reply_enabled),
            _ => None,
        }
    }

    fn text(self, form: &mut ConfigForm) -> Option<&mut String> {
        match self {
            Self::FriendlyName => Some(&mut form.friendly_name),
            Self::ForwardToSip => Some(&mut form.forward_to_sip),
            Self::ForwardToWebhook => Some(&mut form.forward_to_webhook),
            Self::SmsWebhook => Some(&mut form.sms_webhook_url),
            Self::AutoReplyMessage => Some(&mut form.auto_reply_message),
            _ => None,
        }
    }

    fn value(self, form: &ConfigForm, focused: bool) -> String {
        let flag = |on: bool| if on { "[x]" } else { "[ ]" }.to_owned();
        match self {
            Self::FriendlyName => input::display(&form.friendly_name, focused),
            Self::VoiceEnabled => flag(form.voice_enabled),
            Self::ForwardToSip => input::display(&form.forward_to_sip, focused),
            Self::ForwardToWebhook => input::display(&form.forward_to_webhook, focused),
            Self::Voicemail => flag(form.voicemail_enabled),
            Self::SmsEnabled => flag(form.sms_enabled),
            Self::SmsWebhook => input::display(&form.sms_webhook_url, focused),
            Self::AutoReply => flag(form.auto_reply_enabled),
            Self::AutoReplyMessage => input::display(&form.auto_reply_message, focused),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigDialogState {
    focus: usize,
}

impl ConfigDialogState {
    pub fn reset(&mut self) {
        self.focus = 0;
    }

    pub fn focused(&self, dialog: &ConfigDialog) -> Option<Field> {
        Field::available(dialog.number.number.capabilities)
            .get(self.focus)
            .copied()
    }

    pub fn handle_key(&mut self, key: KeyEvent, dialog: &ConfigDialog) -> Option<Action> {
        let fields = Field::available(dialog.number.number.capabilities);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Some(Event::CloseConfig.into()),
            KeyCode::Enter => return Some(Event::RequestSaveConfig.into()),
            KeyCode::Char('s') if ctrl => return Some(Event::RequestSaveConfig.into()),
            KeyCode::Down | KeyCode::Tab => {
                self.focus = (self.focus + 1) % fields.len();
                return None;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.focus = self.focus.checked_sub(1).unwrap_or(fields.len() - 1);
                return None;
            }
            _ => {}
        }

        let field = *fields.get(self.focus)?;
        let mut form = dialog.form.clone();
        let edited = if let Some(flag) = field.toggle(&mut form) {
            if key.code == KeyCode::Char(' ') {
                *flag = !*flag;
                true
            } else {
                false
            }
        } else if let Some(text) = field.text(&mut form) {
            input::edit(text, key)
        } else {
            false
        };

        edited.then(|| Event::EditConfig(form).into())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, dialog: &ConfigDialog, saving: bool) {
        let caps = dialog.number.number.capabilities;
        let fields = Field::available(caps);

        let rows = u16::try_from(fields.len()).unwrap_or(u16::MAX);
        let rect = popup::centered(area, 70, rows.saturating_add(12));
        let title = format!("Configure {}", dialog.number.number.friendly_number);
        let inner = popup::frame_popup(frame, rect, &title);

        let current = self.focused(dialog);
        let mut lines = vec![Line::from("")];
        let push_field = |lines: &mut Vec<Line<'static>>, field: Field| {
            let focused = current == Some(field);
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<16}", field.label()), theme::field_label(focused)),
                Span::styled(field.value(&dialog.form, focused), theme::field_value(focused)),
            ]));
        };

        push_field(&mut lines, Field::FriendlyName);

        lines.push(section("Voice"));
        if caps.voice {
            for field in VOICE_FIELDS {
                push_field(&mut lines, field);
            }
        } else {
            lines.push(Line::from(Span::styled(
                "  Voice is not available on this number",
                theme::disabled(),
            )));
        }

        lines.push(section("SMS"));
        if caps.sms {
            for field in SMS_FIELDS {
                push_field(&mut lines, field);
            }
        } else {
            lines.push(Line::from(Span::styled(
                "  SMS is not available on this number",
                theme::disabled(),
            )));
        }

        lines.push(Line::from(""));
        if saving {
            lines.push(Line::from(Span::styled(
                "  Saving...",
                Style::default().fg(theme::YELLOW),
            )));
        } else {
            lines.push(Line::from(vec![
                Span::styled("  ↑/↓", theme::key_hint_key()),
                Span::styled(" field  ", theme::key_hint()),
                Span::styled("Space", theme::key_hint_key()),
                Span::styled(" toggle  ", theme::key_hint()),
                Span::styled("Enter", theme::key_hint_key()),
                Span::styled(" save  ", theme::key_hint()),
                Span::styled("Esc", theme::key_hint_key()),
                Span::styled(" close", theme::key_hint()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("  {title}"),
        Style::default().fg(theme::CYAN),
    )])
}
