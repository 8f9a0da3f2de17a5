//! Application core: event loop, key routing, workflow dispatch.
//!
//! Keys become [`Action`]s. `Action::Workflow` events go through the
//! reducer, and whatever effects it returns are handed to the data bridge,
//! whose results come back through the same channel.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use didly_core::{Event, Phase, Session, Tab, Workflow};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge;
use crate::event::{Event as TermEvent, EventReader};
use crate::screens::{NumbersScreen, SearchScreen};
use crate::theme;
use crate::tui::Tui;
use crate::widgets::config_dialog::ConfigDialogState;
use crate::widgets::popup;
use crate::widgets::toast::Toasts;

pub struct App {
    session: Session,
    backend_label: String,
    workflow: Workflow,
    search: SearchScreen,
    numbers: NumbersScreen,
    dialog: ConfigDialogState,
    toasts: Toasts,
    help_visible: bool,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(session: Session) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            backend_label: session.backend_label(),
            session,
            workflow: Workflow::new(),
            search: SearchScreen::new(),
            numbers: NumbersScreen::new(),
            dialog: ConfigDialogState::default(),
            toasts: Toasts::default(),
            help_visible: false,
            running: true,
            action_tx,
            action_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let cancel = CancellationToken::new();
        self.session.start_health_probe().await;
        tokio::spawn(data_bridge::health_bridge(
            self.session.health(),
            self.action_tx.clone(),
            cancel.clone(),
        ));
        data_bridge::spawn_refresh(self.session.clone(), self.action_tx.clone());

        let mut events = EventReader::new(Duration::from_millis(250), Duration::from_millis(33));
        info!(backend = %self.backend_label, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                TermEvent::Key(key) => {
                    if let Some(action) = self.handle_key_event(key) {
                        self.action_tx.send(action)?;
                    }
                }
                TermEvent::Tick => self.action_tx.send(Action::Tick)?,
                TermEvent::Resize | TermEvent::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                let render = action == Action::Render;
                self.process_action(action);
                if render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        cancel.cancel();
        self.session.shutdown().await;
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Route a key. Popups take precedence over screens, and screens
    /// holding a text field get keys before the global shortcuts.
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        if self.help_visible {
            return Some(Action::ToggleHelp);
        }

        if self.workflow.pending.is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(Event::Confirm.into()),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Event::Cancel.into()),
                _ => None,
            };
        }

        if let Some(dialog) = self.workflow.config_dialog.as_ref() {
            if self.workflow.configure == Phase::InFlight {
                return None;
            }
            return self.dialog.handle_key(key, dialog);
        }

        let capturing = match self.workflow.tab {
            Tab::Search => self.search.capturing_input(),
            Tab::Owned => self.numbers.capturing_input(),
        };
        if !capturing {
            let other = match self.workflow.tab {
                Tab::Search => Tab::Owned,
                Tab::Owned => Tab::Search,
            };
            match key.code {
                KeyCode::Char('q') => return Some(Action::Quit),
                KeyCode::Char('?') => return Some(Action::ToggleHelp),
                KeyCode::Tab | KeyCode::BackTab => return Some(Event::SelectTab(other).into()),
                KeyCode::Char('1') => return Some(Event::SelectTab(Tab::Search).into()),
                KeyCode::Char('2') => return Some(Event::SelectTab(Tab::Owned).into()),
                _ => {}
            }
        }

        match self.workflow.tab {
            Tab::Search => self.search.handle_key_event(key, &self.workflow),
            Tab::Owned => self.numbers.handle_key_event(key, &self.workflow),
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Tick => self.toasts.expire(Instant::now()),
            Action::Render => {}
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::RefreshOwned => {
                data_bridge::spawn_refresh(self.session.clone(), self.action_tx.clone());
            }
            Action::Notify(notification) => self.toasts.push(notification, Instant::now()),
            Action::Workflow(event) => {
                if matches!(event, Event::OpenConfig(_)) {
                    self.dialog.reset();
                }
                let effects = self.workflow.apply(event);
                for effect in effects {
                    debug!(?effect, "dispatching effect");
                    data_bridge::spawn_effect(&self.session, &self.action_tx, effect);
                }
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([
            Constraint::Min(1),    // screen
            Constraint::Length(1), // tab bar
            Constraint::Length(1), // status bar
        ])
        .split(area);

        match self.workflow.tab {
            Tab::Search => self.search.render(frame, layout[0], &self.workflow),
            Tab::Owned => self.numbers.render(frame, layout[0], &self.workflow),
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if let Some(dialog) = self.workflow.config_dialog.as_ref() {
            let saving = self.workflow.configure == Phase::InFlight;
            self.dialog.render(frame, layout[0], dialog, saving);
        }
        if let Some(pending) = self.workflow.pending.as_ref() {
            popup::render_confirm(frame, area, &pending.prompt);
        }
        if self.help_visible {
            popup::render_help(frame, area);
        }
        self.toasts.render(frame, layout[0]);
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let tabs = [
            (Tab::Search, "1 Search".to_owned()),
            (Tab::Owned, format!("2 {}", self.workflow.owned_tab_label())),
        ];
        let titles: Vec<Line> = tabs
            .iter()
            .map(|(tab, label)| {
                let style = if *tab == self.workflow.tab {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {label} "), style))
            })
            .collect();

        let selected = usize::from(self.workflow.tab == Tab::Owned);
        frame.render_widget(
            Tabs::new(titles)
                .divider(Span::styled(" ", theme::key_hint()))
                .select(selected),
            area,
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (dot, style) = theme::health(self.workflow.health);
        let line = Line::from(vec![
            Span::raw(" "),
            Span::styled(format!("{dot} {}", self.workflow.health.label()), style),
            Span::styled(format!(" │ {}", self.backend_label), theme::key_hint()),
            Span::styled(" │ Tab switch  ? help  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use didly_core::{HealthStatus, SearchFilters, SessionConfig};

    use super::*;

    fn app() -> App {
        let config = SessionConfig {
            health_interval: Duration::ZERO,
            ..SessionConfig::in_memory()
        };
        App::new(Session::new(config).unwrap())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Route a key and apply whatever it produced.
    fn press(app: &mut App, code: KeyCode) {
        if let Some(action) = app.handle_key_event(key(code)) {
            app.process_action(action);
        }
    }

    /// Wait for the next background result and apply it.
    async fn pump(app: &mut App) -> Action {
        let action = app.action_rx.recv().await.unwrap();
        app.process_action(action.clone());
        action
    }

    #[tokio::test]
    async fn q_quits_only_outside_text_fields() {
        let mut app = app();

        // The search form has focus at start, so `q` is text.
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn ctrl_c_always_quits() {
        let mut app = app();
        let action = app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, Some(Action::Quit));
    }

    #[tokio::test]
    async fn tab_switches_screens() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.workflow.tab, Tab::Owned);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.workflow.tab, Tab::Search);
    }

    #[tokio::test]
    async fn search_then_buy_through_the_confirmation_popup() {
        let mut app = app();

        // Empty filters: the whole demo catalog.
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.workflow.search, Phase::InFlight);
        pump(&mut app).await;
        assert_eq!(app.workflow.search, Phase::Done);
        assert_eq!(app.workflow.results.len(), 10);

        // Enter on the first row asks for confirmation; nothing is bought yet.
        press(&mut app, KeyCode::Enter);
        let prompt = app.workflow.pending.as_ref().unwrap().prompt.clone();
        assert!(prompt.starts_with("Purchase 415-555-1234"), "{prompt}");
        assert!(app.session.store().snapshot().is_empty());

        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.workflow.purchase, Phase::InFlight);
        pump(&mut app).await;

        assert_eq!(app.workflow.purchase, Phase::Done);
        assert_eq!(app.workflow.tab, Tab::Owned);
        assert_eq!(app.workflow.owned.len(), 1);
        assert_eq!(app.workflow.results.len(), 9);

        // The success toast comes back through the channel.
        let toast = pump(&mut app).await;
        let Action::Notify(notification) = toast else {
            panic!("expected a toast, got {toast:?}");
        };
        assert_eq!(notification.message, "Phone number purchased successfully!");
    }

    #[tokio::test]
    async fn cancel_leaves_everything_untouched() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        pump(&mut app).await;

        press(&mut app, KeyCode::Enter);
        assert!(app.workflow.pending.is_some());
        press(&mut app, KeyCode::Esc);

        assert!(app.workflow.pending.is_none());
        assert_eq!(app.workflow.purchase, Phase::Idle);
        assert!(app.action_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn invalid_filters_surface_as_an_error_toast() {
        let mut app = app();
        let filters = SearchFilters {
            area_code: Some("41a".into()),
            ..SearchFilters::default()
        };
        app.process_action(Event::SubmitSearch(filters).into());
        pump(&mut app).await;
        assert_eq!(app.workflow.search, Phase::Idle);

        let Action::Notify(notification) = pump(&mut app).await else {
            panic!("expected a toast");
        };
        assert!(notification.message.contains("area"), "{}", notification.message);
    }

    #[tokio::test]
    async fn help_overlay_swallows_the_next_key() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.help_visible);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.help_visible);
        assert!(app.running);
    }

    #[tokio::test]
    async fn health_changes_reach_the_status_bar_state() {
        let mut app = app();
        let cancel = CancellationToken::new();
        tokio::spawn(data_bridge::health_bridge(
            app.session.health(),
            app.action_tx.clone(),
            cancel.clone(),
        ));

        pump(&mut app).await;
        assert_eq!(app.workflow.health, HealthStatus::Checking);

        app.session.check_health().await;
        pump(&mut app).await;
        assert_eq!(app.workflow.health, HealthStatus::Online);
        cancel.cancel();
    }
}
