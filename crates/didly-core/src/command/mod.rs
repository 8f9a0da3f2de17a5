// ── Command API ──
//
// Every mutation flows through a `Command`. The session runs it against
// the backend and then re-fetches the owned collection, whatever the
// command was.

pub mod requests;

use crate::model::OwnedPhoneNumber;

pub use requests::{ConfigForm, ConfigUpdate, SmsConfigUpdate, VoiceConfigUpdate};

/// All write operations against the provisioning backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Buy an available listing.
    Purchase { id: String },
    /// Apply a partial configuration update to an owned number.
    UpdateConfig { id: String, update: ConfigUpdate },
    /// Give an owned number back.
    Release { id: String },
}

impl Command {
    pub fn id(&self) -> &str {
        match self {
            Self::Purchase { id } | Self::UpdateConfig { id, .. } | Self::Release { id } => id,
        }
    }

    /// Toast shown when the command succeeds.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Purchase { .. } => "Phone number purchased successfully!",
            Self::UpdateConfig { .. } => "Configuration updated successfully!",
            Self::Release { .. } => "Phone number released successfully",
        }
    }

    /// Toast shown when the command fails without a server message.
    pub fn failure_fallback(&self) -> &'static str {
        match self {
            Self::Purchase { .. } => "Failed to purchase number",
            Self::UpdateConfig { .. } => "Failed to update configuration",
            Self::Release { .. } => "Failed to release number",
        }
    }
}

/// Outcome of a successful command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Purchased(OwnedPhoneNumber),
    Updated(OwnedPhoneNumber),
    Released { id: String },
}
