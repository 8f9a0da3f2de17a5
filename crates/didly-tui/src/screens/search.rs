//! Search screen: filter form on top, available numbers below.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};

use didly_core::{Event, NumberType, Phase, PhoneNumber, SearchFilters, Workflow, countries};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::input;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Country,
    AreaCode,
    City,
    Pattern,
    Type,
}

impl Field {
    const ALL: [Self; 5] = [
        Self::Country,
        Self::AreaCode,
        Self::City,
        Self::Pattern,
        Self::Type,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::AreaCode => "Area code",
            Self::City => "City",
            Self::Pattern => "Pattern",
            Self::Type => "Type",
        }
    }
}

const TYPES: [NumberType; 3] = [NumberType::Local, NumberType::TollFree, NumberType::Mobile];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Form,
    Results,
}

pub struct SearchScreen {
    focus: Focus,
    field: usize,
    /// Index into `countries()`; `None` means any.
    country: Option<usize>,
    area_code: String,
    city: String,
    pattern: String,
    /// Index into `TYPES`; `None` means any.
    number_type: Option<usize>,
    selected: usize,
}

impl Default for SearchScreen {
    fn default() -> Self {
        Self {
            focus: Focus::Form,
            field: 0,
            country: None,
            area_code: String::new(),
            city: String::new(),
            pattern: String::new(),
            number_type: None,
            selected: 0,
        }
    }
}

impl SearchScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters as currently entered. Blank fields are left unset.
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            country: self
                .country
                .and_then(|i| countries().get(i))
                .map(|c| c.code.to_owned()),
            area_code: input::non_empty(&self.area_code),
            city: input::non_empty(&self.city),
            pattern: input::non_empty(&self.pattern),
            number_type: self.number_type.and_then(|i| TYPES.get(i)).copied(),
        }
    }

    fn current_field(&self) -> Field {
        Field::ALL.get(self.field).copied().unwrap_or(Field::Country)
    }

    fn selected_listing<'a>(&self, workflow: &'a Workflow) -> Option<&'a PhoneNumber> {
        workflow
            .results
            .get(self.selected.min(workflow.results.len().saturating_sub(1)))
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                self.focus = Focus::Results;
                self.selected = 0;
                return Some(Event::SubmitSearch(self.filters()).into());
            }
            KeyCode::Esc => {
                self.focus = Focus::Results;
                return None;
            }
            KeyCode::Down => {
                self.field = (self.field + 1) % Field::ALL.len();
                return None;
            }
            KeyCode::Up => {
                self.field = self.field.checked_sub(1).unwrap_or(Field::ALL.len() - 1);
                return None;
            }
            _ => {}
        }

        match self.current_field() {
            Field::Country => {
                cycle(&mut self.country, countries().len(), key.code);
            }
            Field::Type => {
                cycle(&mut self.number_type, TYPES.len(), key.code);
            }
            Field::AreaCode => {
                input::edit(&mut self.area_code, key);
            }
            Field::City => {
                input::edit(&mut self.city, key);
            }
            Field::Pattern => {
                input::edit(&mut self.pattern, key);
            }
        }
        None
    }

    fn handle_results_key(&mut self, key: KeyEvent, workflow: &Workflow) -> Option<Action> {
        let len = workflow.results.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Char('g') => {
                self.selected = 0;
                None
            }
            KeyCode::Char('G') => {
                self.selected = len.saturating_sub(1);
                None
            }
            KeyCode::Char('/' | 'f') => {
                self.focus = Focus::Form;
                None
            }
            KeyCode::Enter | KeyCode::Char('b') => self
                .selected_listing(workflow)
                .map(|listing| Event::RequestPurchase(listing.clone()).into()),
            _ => None,
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Form;
        let block = Block::default()
            .title(" Search Filters ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let lines: Vec<Line> = Field::ALL
            .iter()
            .enumerate()
            .map(|(i, &field)| {
                let active = focused && i == self.field;
                let value = match field {
                    Field::Country => choice(
                        self.country
                            .and_then(|i| countries().get(i))
                            .map(|c| format!("{} {}", c.flag, c.name)),
                    ),
                    Field::Type => choice(
                        self.number_type
                            .and_then(|i| TYPES.get(i))
                            .map(ToString::to_string),
                    ),
                    Field::AreaCode => input::display(&self.area_code, active),
                    Field::City => input::display(&self.city, active),
                    Field::Pattern => input::display(&self.pattern, active),
                };
                Line::from(vec![
                    Span::styled(format!(" {:<11}", field.label()), theme::field_label(active)),
                    Span::styled(value, theme::field_value(active)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_results(&self, frame: &mut Frame, area: Rect, workflow: &Workflow) {
        let focused = self.focus == Focus::Results;
        let mut title = format!(" Available Numbers ({}) ", workflow.results.len());
        if workflow.search == Phase::InFlight {
            title.push_str("· searching… ");
        }
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if workflow.results.is_empty() {
            let hint = match workflow.search {
                Phase::Done => "No numbers match these filters",
                Phase::InFlight => "Searching...",
                _ => "Set filters and press Enter to search",
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(hint, theme::key_hint()))),
                inner,
            );
            return;
        }

        let header = Row::new(
            ["Number", "Location", "Type", "Capabilities", "Monthly"]
                .map(|h| Cell::from(h).style(theme::table_header())),
        );

        let selected = self.selected.min(workflow.results.len() - 1);
        let rows: Vec<Row> = workflow
            .results
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let is_selected = focused && i == selected;
                let prefix = if is_selected { "▸" } else { " " };
                Row::new(vec![
                    Cell::from(format!("{prefix}{}", n.friendly_number)).style(
                        Style::default().fg(theme::CYAN).add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                    ),
                    Cell::from(format!("{}, {} {}", n.city, n.region, n.country)),
                    Cell::from(n.number_type.to_string()),
                    Cell::from(n.capabilities.labels()),
                    Cell::from(n.price_label()).style(Style::default().fg(theme::CORAL)),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(18),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(12),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = TableState::default();
        if focused {
            state.select(Some(selected));
        }
        frame.render_stateful_widget(table, inner, &mut state);
    }
}

impl Component for SearchScreen {
    fn handle_key_event(&mut self, key: KeyEvent, workflow: &Workflow) -> Option<Action> {
        match self.focus {
            Focus::Form => self.handle_form_key(key),
            Focus::Results => self.handle_results_key(key, workflow),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, workflow: &Workflow) {
        let layout = Layout::vertical([
            Constraint::Length(7), // form
            Constraint::Min(3),    // results
            Constraint::Length(1), // hints
        ])
        .split(area);

        self.render_form(frame, layout[0]);
        self.render_results(frame, layout[1], workflow);

        let hints = match self.focus {
            Focus::Form => vec![
                Span::styled("  ↑/↓ ", theme::key_hint_key()),
                Span::styled("field  ", theme::key_hint()),
                Span::styled("←/→ ", theme::key_hint_key()),
                Span::styled("choose  ", theme::key_hint()),
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("search  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("results", theme::key_hint()),
            ],
            Focus::Results => vec![
                Span::styled("  j/k ", theme::key_hint_key()),
                Span::styled("navigate  ", theme::key_hint()),
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("buy  ", theme::key_hint()),
                Span::styled("/ ", theme::key_hint_key()),
                Span::styled("filters", theme::key_hint()),
            ],
        };
        frame.render_widget(Paragraph::new(Line::from(hints)), layout[2]);
    }

    fn capturing_input(&self) -> bool {
        self.focus == Focus::Form
    }
}

/// Step an optional index through `None, 0, 1, .., len-1` with ←/→.
fn cycle(value: &mut Option<usize>, len: usize, code: KeyCode) {
    *value = match (code, *value) {
        (KeyCode::Right, None) => Some(0),
        (KeyCode::Right, Some(i)) if i + 1 < len => Some(i + 1),
        (KeyCode::Right, Some(_)) => None,
        (KeyCode::Left, None) => len.checked_sub(1),
        (KeyCode::Left, Some(0)) => None,
        (KeyCode::Left, Some(i)) => Some(i - 1),
        (_, current) => current,
    };
}

fn choice(value: Option<String>) -> String {
    format!("‹ {} ›", value.unwrap_or_else(|| "Any".into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut SearchScreen, text: &str, workflow: &Workflow) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c)), workflow);
        }
    }

    #[test]
    fn empty_form_submits_empty_filters() {
        let mut screen = SearchScreen::new();
        let action = screen.handle_key_event(key(KeyCode::Enter), &Workflow::new());
        assert_eq!(
            action,
            Some(Action::Workflow(Event::SubmitSearch(SearchFilters::default())))
        );
    }

    #[test]
    fn form_fields_build_filters() {
        let wf = Workflow::new();
        let mut screen = SearchScreen::new();

        // Country: → picks the first catalog entry.
        screen.handle_key_event(key(KeyCode::Right), &wf);
        screen.handle_key_event(key(KeyCode::Down), &wf);
        type_text(&mut screen, "415", &wf);
        screen.handle_key_event(key(KeyCode::Down), &wf);
        type_text(&mut screen, "san francisco", &wf);
        screen.handle_key_event(key(KeyCode::Down), &wf);
        screen.handle_key_event(key(KeyCode::Down), &wf);
        screen.handle_key_event(key(KeyCode::Right), &wf);
        screen.handle_key_event(key(KeyCode::Right), &wf);

        assert_eq!(
            screen.filters(),
            SearchFilters {
                country: Some("US".into()),
                area_code: Some("415".into()),
                city: Some("san francisco".into()),
                pattern: None,
                number_type: Some(NumberType::TollFree),
            }
        );
    }

    #[test]
    fn choices_cycle_back_to_any() {
        let mut value = None;
        cycle(&mut value, 2, KeyCode::Right);
        cycle(&mut value, 2, KeyCode::Right);
        assert_eq!(value, Some(1));
        cycle(&mut value, 2, KeyCode::Right);
        assert_eq!(value, None);
        cycle(&mut value, 2, KeyCode::Left);
        assert_eq!(value, Some(1));
    }

    #[test]
    fn typing_q_in_the_form_is_text_not_a_shortcut() {
        let wf = Workflow::new();
        let mut screen = SearchScreen::new();
        assert!(screen.capturing_input());
        screen.handle_key_event(key(KeyCode::Down), &wf);
        screen.handle_key_event(key(KeyCode::Down), &wf);
        type_text(&mut screen, "quincy", &wf);
        assert_eq!(screen.filters().city.as_deref(), Some("quincy"));
    }

    #[test]
    fn enter_on_results_requests_purchase_of_selection() {
        let mut wf = Workflow::new();
        let mut screen = SearchScreen::new();
        screen.handle_key_event(key(KeyCode::Enter), &wf);
        assert!(!screen.capturing_input());

        let listings = didly_core::backend::memory::fixture_listings("USD");
        wf.results = listings[..3].to_vec();

        screen.handle_key_event(key(KeyCode::Char('j')), &wf);
        let action = screen.handle_key_event(key(KeyCode::Enter), &wf);
        assert_eq!(
            action,
            Some(Action::Workflow(Event::RequestPurchase(listings[1].clone())))
        );

        // Clamped at the end of the list.
        for _ in 0..5 {
            screen.handle_key_event(key(KeyCode::Char('j')), &wf);
        }
        let action = screen.handle_key_event(key(KeyCode::Char('b')), &wf);
        assert_eq!(
            action,
            Some(Action::Workflow(Event::RequestPurchase(listings[2].clone())))
        );
    }
}
