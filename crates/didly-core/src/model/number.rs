// ── Phone number domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Kind of number being offered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum NumberType {
    #[default]
    #[strum(to_string = "local")]
    Local,
    #[strum(to_string = "toll-free", serialize = "tollfree", serialize = "toll_free")]
    TollFree,
    #[strum(to_string = "mobile", serialize = "cell")]
    Mobile,
}

/// What a number can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub voice: bool,
    pub sms: bool,
    pub mms: bool,
}

impl Capabilities {
    /// Applied when the backend says nothing about capabilities.
    ///
    /// Policy: assume voice and SMS, never assume MMS. This is a blanket
    /// default, not a per-number inference.
    pub const DEFAULT_POLICY: Self = Self {
        voice: true,
        sms: true,
        mms: false,
    };

    /// Short label list, e.g. `"voice, sms"`.
    pub fn labels(&self) -> String {
        let mut out = Vec::with_capacity(3);
        if self.voice {
            out.push("voice");
        }
        if self.sms {
            out.push("sms");
        }
        if self.mms {
            out.push("mms");
        }
        out.join(", ")
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::DEFAULT_POLICY
    }
}

/// A number available for purchase.
///
/// `friendly_number` and `area_code` are always derived from
/// `phone_number` by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: String,
    /// Canonical dialable form.
    pub phone_number: String,
    pub friendly_number: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub area_code: String,
    pub capabilities: Capabilities,
    pub monthly_price: f64,
    pub currency: String,
    pub number_type: NumberType,
}

impl PhoneNumber {
    pub fn price_label(&self) -> String {
        format_price(self.monthly_price, &self.currency)
    }

    /// Text shown before committing a purchase.
    pub fn purchase_prompt(&self) -> String {
        format!(
            "Purchase {} for {:.2} {}/month?",
            self.friendly_number, self.monthly_price, self.currency
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub forward_to_sip: Option<String>,
    pub forward_to_webhook: Option<String>,
    pub voicemail_enabled: bool,
    pub voicemail_greeting: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsConfig {
    pub webhook_url: Option<String>,
    pub auto_reply_enabled: bool,
    pub auto_reply_message: Option<String>,
}

/// A number the caller owns, plus its routing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedPhoneNumber {
    #[serde(flatten)]
    pub number: PhoneNumber,
    pub friendly_name: Option<String>,
    pub voice_enabled: bool,
    pub sms_enabled: bool,
    pub voice_config: Option<VoiceConfig>,
    pub sms_config: Option<SmsConfig>,
    pub purchased_at: Option<DateTime<Utc>>,
}

impl OwnedPhoneNumber {
    /// Fresh ownership record: both channels on, stamped now.
    pub fn purchased(number: PhoneNumber, at: DateTime<Utc>) -> Self {
        Self {
            number,
            friendly_name: None,
            voice_enabled: true,
            sms_enabled: true,
            voice_config: None,
            sms_config: None,
            purchased_at: Some(at),
        }
    }

    pub fn id(&self) -> &str {
        &self.number.id
    }

    /// Friendly name if set, otherwise the formatted number.
    pub fn display_name(&self) -> &str {
        self.friendly_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.number.friendly_number)
    }

    /// Text shown before committing a release.
    pub fn release_prompt(&self) -> String {
        format!(
            "Are you sure you want to release {}? This action cannot be undone.",
            self.number.friendly_number
        )
    }
}

/// Render a monthly price the way the dashboard shows it.
pub fn format_price(amount: f64, currency: &str) -> String {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => format!("${amount:.2}"),
        "CAD" => format!("CA${amount:.2}"),
        "AUD" => format!("A${amount:.2}"),
        "GBP" => format!("£{amount:.2}"),
        "EUR" => format!("€{amount:.2}"),
        other => format!("{amount:.2} {other}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn number_type_parses_common_spellings() {
        assert_eq!("toll-free".parse::<NumberType>().unwrap(), NumberType::TollFree);
        assert_eq!("TollFree".parse::<NumberType>().unwrap(), NumberType::TollFree);
        assert_eq!("toll_free".parse::<NumberType>().unwrap(), NumberType::TollFree);
        assert_eq!("Local".parse::<NumberType>().unwrap(), NumberType::Local);
        assert!("satellite".parse::<NumberType>().is_err());
        assert_eq!(NumberType::TollFree.to_string(), "toll-free");
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(1.0, "USD"), "$1.00");
        assert_eq!(format_price(2.0, "gbp"), "£2.00");
        assert_eq!(format_price(2.5, "AUD"), "A$2.50");
        assert_eq!(format_price(3.0, "JPY"), "3.00 JPY");
    }

    #[test]
    fn capability_labels() {
        assert_eq!(Capabilities::DEFAULT_POLICY.labels(), "voice, sms");
        let none = Capabilities {
            voice: false,
            sms: false,
            mms: false,
        };
        assert_eq!(none.labels(), "");
    }
}
