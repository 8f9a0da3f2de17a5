// ── Domain model ──
//
// Canonical types shared by the CLI and TUI. Everything here is a plain
// value: cloned freely between layers, never shared mutably.

pub mod filters;
pub mod number;
pub mod supporting;

pub use filters::{SearchFilters, wildcard_match};
pub use number::{
    Capabilities, NumberType, OwnedPhoneNumber, PhoneNumber, SmsConfig, VoiceConfig, format_price,
};
pub use supporting::{Country, Customer, HealthStatus, countries, find_country};
