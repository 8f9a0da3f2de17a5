//! My Numbers screen: owned numbers with a free-text filter and a detail
//! pane for the selection.

use std::sync::Arc;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use didly_core::{Event, OwnedPhoneNumber, Phase, Workflow};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::input;

#[derive(Default)]
pub struct NumbersScreen {
    query: String,
    editing: bool,
}

impl NumbersScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the selected number among the visible ones. Falls back to
    /// the first row when the selection is unset or filtered away.
    fn selected_index(visible: &[Arc<OwnedPhoneNumber>], workflow: &Workflow) -> Option<usize> {
        if visible.is_empty() {
            return None;
        }
        let found = workflow
            .selected
            .as_deref()
            .and_then(|id| visible.iter().position(|n| n.id() == id));
        Some(found.unwrap_or(0))
    }

    fn selected(workflow: &Workflow) -> Option<Arc<OwnedPhoneNumber>> {
        let visible = workflow.visible_owned();
        let idx = Self::selected_index(&visible, workflow)?;
        visible.get(idx).cloned()
    }

    fn select_at(visible: &[Arc<OwnedPhoneNumber>], idx: usize) -> Option<Action> {
        visible
            .get(idx)
            .map(|n| Event::Select(Some(n.id().to_owned())).into())
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.editing = false;
                None
            }
            _ if input::edit(&mut self.query, key) => {
                Some(Event::SetOwnedQuery(self.query.clone()).into())
            }
            _ => None,
        }
    }

    fn render_table(
        frame: &mut Frame,
        area: Rect,
        visible: &[Arc<OwnedPhoneNumber>],
        selected: Option<usize>,
    ) {
        let header = Row::new(
            ["Number", "Name", "City", "Voice", "SMS", "Purchased"]
                .map(|h| Cell::from(h).style(theme::table_header())),
        );

        let on_off = |on: bool| {
            if on {
                Cell::from("on").style(Style::default().fg(theme::GREEN))
            } else {
                Cell::from("off").style(theme::key_hint())
            }
        };

        let rows: Vec<Row> = visible
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let is_selected = Some(i) == selected;
                let prefix = if is_selected { "▸" } else { " " };
                Row::new(vec![
                    Cell::from(format!("{prefix}{}", n.number.friendly_number)).style(
                        Style::default().fg(theme::CYAN).add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                    ),
                    Cell::from(n.friendly_name.clone().unwrap_or_else(|| "─".into())),
                    Cell::from(n.number.city.clone()),
                    on_off(n.voice_enabled),
                    on_off(n.sms_enabled),
                    Cell::from(purchased_label(n)),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(18),
            Constraint::Min(14),
            Constraint::Length(16),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(17),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_detail(frame: &mut Frame, area: Rect, number: &OwnedPhoneNumber) {
        let block = Block::default()
            .title(format!(" {} ", number.display_name()))
            .title_style(theme::title_style())
            .borders(Borders::TOP)
            .border_style(theme::border_default());

        let label = |text: &'static str| Span::styled(format!("  {text:<16}"), theme::key_hint());
        let value = |text: String| Span::styled(text, Style::default().fg(theme::DIM_WHITE));
        let or_dash = |v: Option<&String>| {
            v.filter(|s| !s.is_empty())
                .cloned()
                .unwrap_or_else(|| "─".into())
        };

        let voice = number.voice_config.clone().unwrap_or_default();
        let sms = number.sms_config.clone().unwrap_or_default();
        let n = &number.number;

        let lines = vec![
            Line::from(vec![label("Number"), value(n.phone_number.clone())]),
            Line::from(vec![
                label("Location"),
                value(format!("{}, {} {}", n.city, n.region, n.country)),
            ]),
            Line::from(vec![label("Capabilities"), value(n.capabilities.labels())]),
            Line::from(vec![label("Monthly"), value(n.price_label())]),
            Line::from(vec![
                label("Forward to SIP"),
                value(or_dash(voice.forward_to_sip.as_ref())),
            ]),
            Line::from(vec![
                label("Voice webhook"),
                value(or_dash(voice.forward_to_webhook.as_ref())),
            ]),
            Line::from(vec![
                label("Voicemail"),
                value(if voice.voicemail_enabled { "on" } else { "off" }.into()),
            ]),
            Line::from(vec![label("SMS webhook"), value(or_dash(sms.webhook_url.as_ref()))]),
            Line::from(vec![
                label("Auto-reply"),
                value(if sms.auto_reply_enabled {
                    or_dash(sms.auto_reply_message.as_ref())
                } else {
                    "off".into()
                }),
            ]),
        ];

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

fn purchased_label(number: &OwnedPhoneNumber) -> String {
    number.purchased_at.map_or_else(
        || "─".into(),
        |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

impl Component for NumbersScreen {
    fn handle_key_event(&mut self, key: KeyEvent, workflow: &Workflow) -> Option<Action> {
        if self.editing {
            return self.handle_filter_key(key);
        }

        let visible = workflow.visible_owned();
        let current = Self::selected_index(&visible, workflow);
        match key.code {
            KeyCode::Char('/') => {
                self.editing = true;
                None
            }
            KeyCode::Esc if !self.query.is_empty() => {
                self.query.clear();
                Some(Event::SetOwnedQuery(String::new()).into())
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let next = current.map_or(0, |i| (i + 1).min(visible.len().saturating_sub(1)));
                Self::select_at(&visible, next)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                Self::select_at(&visible, current.unwrap_or(0).saturating_sub(1))
            }
            KeyCode::Char('g') => Self::select_at(&visible, 0),
            KeyCode::Char('G') => Self::select_at(&visible, visible.len().saturating_sub(1)),
            KeyCode::Enter | KeyCode::Char('c') => {
                Self::selected(workflow).map(|n| Event::OpenConfig(n).into())
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                Self::selected(workflow).map(|n| Event::RequestRelease(n).into())
            }
            KeyCode::Char('r') => Some(Action::RefreshOwned),
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, workflow: &Workflow) {
        let visible = workflow.visible_owned();
        let selected = Self::selected_index(&visible, workflow);

        let mut title = format!(" My Numbers ({}) ", workflow.owned.len());
        if workflow.release == Phase::InFlight {
            title.push_str("· releasing… ");
        } else if workflow.purchase == Phase::InFlight {
            title.push_str("· purchasing… ");
        }
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1),      // filter
            Constraint::Percentage(55), // table
            Constraint::Min(4),         // detail
            Constraint::Length(1),      // hints
        ])
        .split(inner);

        let filter = Line::from(vec![
            Span::styled(" Filter: ", theme::field_label(self.editing)),
            Span::styled(
                input::display(&self.query, self.editing),
                theme::field_value(self.editing),
            ),
        ]);
        frame.render_widget(Paragraph::new(filter), layout[0]);

        if visible.is_empty() {
            let hint = if workflow.owned.is_empty() {
                "You don't own any numbers yet. Buy one from the Search tab."
            } else {
                "No numbers match the filter"
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(hint, theme::key_hint()))),
                layout[1],
            );
        } else {
            Self::render_table(frame, layout[1], &visible, selected);
            if let Some(number) = selected.and_then(|i| visible.get(i)) {
                Self::render_detail(frame, layout[2], number);
            }
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("/ ", theme::key_hint_key()),
            Span::styled("filter  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("configure  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("release  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("reload", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[3]);
    }

    fn capturing_input(&self) -> bool {
        self.editing
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use didly_core::backend::memory::fixture_listings;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn workflow_with(ids: &[&str]) -> Workflow {
        let mut wf = Workflow::new();
        wf.owned = fixture_listings("USD")
            .into_iter()
            .filter(|n| ids.contains(&n.id.as_str()))
            .map(|n| Arc::new(OwnedPhoneNumber::purchased(n, Utc::now())))
            .collect();
        wf
    }

    fn apply(wf: &mut Workflow, action: Option<Action>) {
        if let Some(Action::Workflow(event)) = action {
            wf.apply(event);
        }
    }

    #[test]
    fn navigation_moves_the_workflow_selection() {
        let mut wf = workflow_with(&["1", "2", "3"]);
        let mut screen = NumbersScreen::new();

        let action = screen.handle_key_event(key(KeyCode::Char('j')), &wf);
        assert_eq!(action, Some(Action::Workflow(Event::Select(Some("2".into())))));
        apply(&mut wf, action);

        let action = screen.handle_key_event(key(KeyCode::Char('G')), &wf);
        assert_eq!(action, Some(Action::Workflow(Event::Select(Some("3".into())))));
        apply(&mut wf, action);

        let action = screen.handle_key_event(key(KeyCode::Char('k')), &wf);
        assert_eq!(action, Some(Action::Workflow(Event::Select(Some("2".into())))));
    }

    #[test]
    fn filter_typing_updates_the_query() {
        let mut wf = workflow_with(&["1", "8"]);
        let mut screen = NumbersScreen::new();

        screen.handle_key_event(key(KeyCode::Char('/')), &wf);
        assert!(screen.capturing_input());
        let mut last = None;
        for c in "chi".chars() {
            last = screen.handle_key_event(key(KeyCode::Char(c)), &wf);
        }
        assert_eq!(
            last,
            Some(Action::Workflow(Event::SetOwnedQuery("chi".into())))
        );
        apply(&mut wf, last);
        screen.handle_key_event(key(KeyCode::Enter), &wf);
        assert!(!screen.capturing_input());

        let visible: Vec<_> = wf.visible_owned().iter().map(|n| n.id().to_owned()).collect();
        assert_eq!(visible, vec!["8".to_owned()]);
    }

    #[test]
    fn release_and_configure_target_the_selection() {
        let mut wf = workflow_with(&["1", "2"]);
        wf.selected = Some("2".into());
        let mut screen = NumbersScreen::new();

        let Some(Action::Workflow(Event::RequestRelease(n))) =
            screen.handle_key_event(key(KeyCode::Char('d')), &wf)
        else {
            panic!("expected a release request");
        };
        assert_eq!(n.id(), "2");

        let Some(Action::Workflow(Event::OpenConfig(n))) =
            screen.handle_key_event(key(KeyCode::Enter), &wf)
        else {
            panic!("expected the config dialog");
        };
        assert_eq!(n.id(), "2");
    }

    #[test]
    fn nothing_to_act_on_without_numbers() {
        let wf = Workflow::new();
        let mut screen = NumbersScreen::new();
        assert_eq!(screen.handle_key_event(key(KeyCode::Char('d')), &wf), None);
        assert_eq!(screen.handle_key_event(key(KeyCode::Char('j')), &wf), None);
        assert_eq!(
            screen.handle_key_event(key(KeyCode::Char('r')), &wf),
            Some(Action::RefreshOwned)
        );
    }
}
