//! Domain and orchestration layer between `didly-api` and the UIs (CLI / TUI).
//!
//! - **[`Session`]**: Central facade. Owns the backend, the owned-number
//!   store, and the background health probe. Every mutation goes through
//!   [`Session::execute`] and is followed by a full re-fetch of the owned
//!   collection.
//!
//! - **[`DidBackend`]**: Seam between orchestration and data. The HTTP
//!   adapter ([`HttpBackend`]) and the seeded [`InMemoryBackend`] both
//!   implement it.
//!
//! - **Normalizer** ([`normalize`]): Turns loose backend records into
//!   domain values, deriving friendly numbers and area codes, or fails with
//!   a [`NormalizationError`].
//!
//! - **[`filter_owned`]**: Pure free-text filter over owned numbers.
//!
//! - **[`Workflow`]**: Reducer-style state machine for the interactive
//!   flows: search, then confirm-before-commit purchase, configure, and
//!   release, with notifications for every outcome.

pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod session;
pub mod store;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{DidBackend, HttpBackend, InMemoryBackend};
pub use command::{
    Command, CommandResult, ConfigForm, ConfigUpdate, SmsConfigUpdate, VoiceConfigUpdate,
};
pub use config::{BackendTarget, ProvisioningDefaults, SessionConfig, TlsVerification};
pub use error::CoreError;
pub use filter::filter_owned;
pub use normalize::{NormalizationError, Normalized, NormalizerConfig};
pub use session::Session;
pub use store::{OwnedSnapshot, OwnedStore};
pub use workflow::{
    Effect, Event, Notification, NotificationLevel, Operation, Phase, Tab, Workflow,
};

pub use model::{
    Capabilities, Country, Customer, HealthStatus, NumberType, OwnedPhoneNumber, PhoneNumber,
    SearchFilters, SmsConfig, VoiceConfig, countries, find_country, format_price,
};
