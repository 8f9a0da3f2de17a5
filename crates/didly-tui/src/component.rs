//! Component trait for the two screens.

use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use didly_core::Workflow;

use crate::action::Action;

/// A screen owns its view-local state (focus, text fields, cursor) and
/// reads everything else from the [`Workflow`].
pub trait Component {
    /// Handle a key the app didn't consume. Return an action to dispatch.
    fn handle_key_event(&mut self, key: KeyEvent, workflow: &Workflow) -> Option<Action>;

    fn render(&self, frame: &mut Frame, area: Rect, workflow: &Workflow);

    /// A text field is taking keystrokes; single-letter shortcuts stand down.
    fn capturing_input(&self) -> bool {
        false
    }
}
