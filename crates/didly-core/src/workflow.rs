// ── Workflow state machine ──
//
// View/state orchestration as a pure reducer: `apply(event) -> effects`.
// No I/O happens here. A driver (the TUI event loop, or a test) executes
// the returned effects and feeds the outcomes back in as events.
//
// Each operation has its own track (search, purchase, configure,
// release). Mutations go request -> await confirmation -> commit; nothing
// reaches the backend without an explicit `Confirm`.

use std::sync::Arc;

use crate::command::{Command, CommandResult, ConfigForm, ConfigUpdate};
use crate::filter::filter_owned;
use crate::model::{HealthStatus, OwnedPhoneNumber, PhoneNumber, SearchFilters};

const SEARCH_FAILED: &str = "Failed to search numbers";
const REFRESH_FAILED: &str = "Failed to load your numbers";

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Search,
    Owned,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingConfirmation,
    InFlight,
    Done,
}

impl Phase {
    /// Whether a new request may start on this track.
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Idle | Self::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Purchase,
    Configure,
    Release,
}

impl Operation {
    fn of(cmd: &Command) -> Self {
        match cmd {
            Command::Purchase { .. } => Self::Purchase,
            Command::UpdateConfig { .. } => Self::Configure,
            Command::Release { .. } => Self::Release,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// A mutation waiting for the user to say yes.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    pub command: Command,
    pub prompt: String,
}

/// The open configuration dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDialog {
    pub number: Arc<OwnedPhoneNumber>,
    pub form: ConfigForm,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workflow {
    pub tab: Tab,
    pub health: HealthStatus,

    // Search
    pub filters: SearchFilters,
    pub search: Phase,
    pub results: Vec<PhoneNumber>,
    search_seq: u64,

    // Owned
    pub owned: Vec<Arc<OwnedPhoneNumber>>,
    pub owned_query: String,
    pub selected: Option<String>,

    // Mutations
    pub purchase: Phase,
    pub configure: Phase,
    pub release: Phase,
    pub pending: Option<PendingConfirmation>,
    pub config_dialog: Option<ConfigDialog>,
}

// ── Events and effects ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SelectTab(Tab),
    Select(Option<String>),
    HealthChanged(HealthStatus),
    SetOwnedQuery(String),

    /// Manual search submit. Filter edits alone never search.
    SubmitSearch(SearchFilters),
    SearchSucceeded { seq: u64, results: Vec<PhoneNumber> },
    SearchFailed { seq: u64, message: Option<String> },

    RequestPurchase(PhoneNumber),
    OpenConfig(Arc<OwnedPhoneNumber>),
    EditConfig(ConfigForm),
    CloseConfig,
    RequestSaveConfig,
    RequestRelease(Arc<OwnedPhoneNumber>),
    Confirm,
    Cancel,

    /// The command ran and the owned collection was re-fetched.
    CommandSucceeded {
        result: CommandResult,
        owned: Vec<Arc<OwnedPhoneNumber>>,
    },
    CommandFailed {
        command: Command,
        message: Option<String>,
    },

    OwnedRefreshed(Vec<Arc<OwnedPhoneNumber>>),
    OwnedRefreshFailed { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Search { seq: u64, filters: SearchFilters },
    /// Run the command, then re-fetch owned numbers; report back with
    /// `CommandSucceeded` or `CommandFailed`.
    Execute(Command),
    Notify(Notification),
}

// ── Reducer ──────────────────────────────────────────────────────────

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned numbers matching the current free-text query.
    pub fn visible_owned(&self) -> Vec<Arc<OwnedPhoneNumber>> {
        filter_owned(&self.owned, &self.owned_query)
    }

    pub fn selected_owned(&self) -> Option<&Arc<OwnedPhoneNumber>> {
        let id = self.selected.as_deref()?;
        self.owned.iter().find(|n| n.id() == id)
    }

    pub fn track(&self, op: Operation) -> Phase {
        match op {
            Operation::Purchase => self.purchase,
            Operation::Configure => self.configure,
            Operation::Release => self.release,
        }
    }

    fn track_mut(&mut self, op: Operation) -> &mut Phase {
        match op {
            Operation::Purchase => &mut self.purchase,
            Operation::Configure => &mut self.configure,
            Operation::Release => &mut self.release,
        }
    }

    /// Tab label for owned numbers, e.g. `My Numbers (3)`.
    pub fn owned_tab_label(&self) -> String {
        format!("My Numbers ({})", self.owned.len())
    }

    #[allow(clippy::too_many_lines)]
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::SelectTab(tab) => {
                self.tab = tab;
                Vec::new()
            }
            Event::Select(id) => {
                self.selected = id;
                Vec::new()
            }
            Event::HealthChanged(status) => {
                self.health = status;
                Vec::new()
            }
            Event::SetOwnedQuery(query) => {
                self.owned_query = query;
                Vec::new()
            }

            // ── Search ──
            Event::SubmitSearch(filters) => {
                self.search_seq += 1;
                self.search = Phase::InFlight;
                self.filters = filters.clone();
                vec![Effect::Search {
                    seq: self.search_seq,
                    filters,
                }]
            }
            Event::SearchSucceeded { seq, results } => {
                if seq != self.search_seq {
                    return Vec::new();
                }
                self.search = Phase::Done;
                self.results = results;
                Vec::new()
            }
            Event::SearchFailed { seq, message } => {
                if seq != self.search_seq {
                    return Vec::new();
                }
                self.search = Phase::Idle;
                vec![Effect::Notify(Notification::error(
                    message.unwrap_or_else(|| SEARCH_FAILED.into()),
                ))]
            }

            // ── Requests ──
            Event::RequestPurchase(listing) => {
                let prompt = listing.purchase_prompt();
                self.request(
                    Command::Purchase {
                        id: listing.id.clone(),
                    },
                    prompt,
                )
            }
            Event::OpenConfig(number) => {
                if self.configure.is_ready() {
                    self.config_dialog = Some(ConfigDialog {
                        form: ConfigForm::from_owned(&number),
                        number,
                    });
                }
                Vec::new()
            }
            Event::EditConfig(form) => {
                if let Some(dialog) = self.config_dialog.as_mut() {
                    dialog.form = form;
                }
                Vec::new()
            }
            Event::CloseConfig => {
                self.config_dialog = None;
                Vec::new()
            }
            Event::RequestSaveConfig => {
                let Some(dialog) = self.config_dialog.as_ref() else {
                    return Vec::new();
                };
                let update: ConfigUpdate = dialog.form.to_update(&dialog.number);
                if update.is_empty() {
                    return vec![Effect::Notify(Notification::info("No changes to save"))];
                }
                let prompt = format!(
                    "Save configuration for {}?",
                    dialog.number.number.friendly_number
                );
                let command = Command::UpdateConfig {
                    id: dialog.number.id().to_owned(),
                    update,
                };
                self.request(command, prompt)
            }
            Event::RequestRelease(number) => {
                let prompt = number.release_prompt();
                self.request(
                    Command::Release {
                        id: number.id().to_owned(),
                    },
                    prompt,
                )
            }

            // ── Confirmation ──
            Event::Confirm => {
                let Some(pending) = self.pending.take() else {
                    return Vec::new();
                };
                *self.track_mut(Operation::of(&pending.command)) = Phase::InFlight;
                vec![Effect::Execute(pending.command)]
            }
            Event::Cancel => {
                if let Some(pending) = self.pending.take() {
                    *self.track_mut(Operation::of(&pending.command)) = Phase::Idle;
                }
                Vec::new()
            }

            // ── Outcomes ──
            Event::CommandSucceeded { result, owned } => {
                self.owned = owned;
                let (op, message) = match &result {
                    CommandResult::Purchased(_) => {
                        self.tab = Tab::Owned;
                        (Operation::Purchase, "Phone number purchased successfully!")
                    }
                    CommandResult::Updated(_) => {
                        self.config_dialog = None;
                        (Operation::Configure, "Configuration updated successfully!")
                    }
                    CommandResult::Released { id } => {
                        if self.selected.as_deref() == Some(id.as_str()) {
                            self.selected = None;
                        }
                        (Operation::Release, "Phone number released successfully")
                    }
                };
                if let CommandResult::Purchased(number) = &result {
                    let id = number.id().to_owned();
                    self.results.retain(|n| n.id != id);
                    self.selected = Some(id);
                }
                *self.track_mut(op) = Phase::Done;
                vec![Effect::Notify(Notification::success(message))]
            }
            Event::CommandFailed { command, message } => {
                *self.track_mut(Operation::of(&command)) = Phase::Idle;
                let text = message.unwrap_or_else(|| command.failure_fallback().to_owned());
                vec![Effect::Notify(Notification::error(text))]
            }

            Event::OwnedRefreshed(owned) => {
                self.owned = owned;
                if let Some(id) = self.selected.as_deref() {
                    if !self.owned.iter().any(|n| n.id() == id) {
                        self.selected = None;
                    }
                }
                Vec::new()
            }
            Event::OwnedRefreshFailed { message } => vec![Effect::Notify(Notification::error(
                message.unwrap_or_else(|| REFRESH_FAILED.into()),
            ))],
        }
    }

    /// Park a mutation until the user confirms. Only one confirmation can
    /// be pending, and a track that's already busy can't start another.
    fn request(&mut self, command: Command, prompt: String) -> Vec<Effect> {
        let op = Operation::of(&command);
        if self.pending.is_some() || !self.track(op).is_ready() {
            return vec![Effect::Notify(Notification::info(
                "Another action is waiting to finish",
            ))];
        }
        *self.track_mut(op) = Phase::AwaitingConfirmation;
        self.pending = Some(PendingConfirmation { command, prompt });
        Vec::new()
    }
}
