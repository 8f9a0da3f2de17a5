//! Everything the app loop can be asked to do.

use didly_core::{Event, Notification};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Tick,
    Render,
    ToggleHelp,

    /// Input for the workflow reducer. Screens, popups, and background
    /// tasks all speak to the workflow through this.
    Workflow(Event),

    /// Re-fetch owned numbers outside of a command.
    RefreshOwned,

    /// Toast that doesn't come from the reducer (skipped records and such).
    Notify(Notification),
}

impl From<Event> for Action {
    fn from(event: Event) -> Self {
        Self::Workflow(event)
    }
}
