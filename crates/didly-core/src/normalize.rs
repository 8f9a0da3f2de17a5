// ── Backend-to-domain normalization ──
//
// Raw backend records (`didly_api::types::Raw*`) come in several shapes.
// This module is the single place they become domain values. Every
// derived field (friendly form, area code, number type) is computed here
// from the dialable number so the two can never disagree.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use didly_api::types::{
    RawCapabilities, RawCustomer, RawDid, RawRecord, RawSmsConfig, RawVoiceConfig,
};

use crate::model::{
    Capabilities, Customer, NumberType, OwnedPhoneNumber, PhoneNumber, SmsConfig, VoiceConfig,
};

/// North American toll-free prefixes.
const TOLL_FREE_PREFIXES: &[&str] = &["800", "833", "844", "855", "866", "877", "888"];

/// Raised when a backend record can't be turned into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("backend record is missing `{field}`")]
    MissingField { field: &'static str },

    #[error("backend record has an unusable `{field}`: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("unexpected backend response: {message}")]
    Malformed { message: String },
}

/// Deployment settings the normalizer applies uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Currency stamped on every listing; backends don't report one.
    pub currency: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
        }
    }
}

/// Result of normalizing a list: the good records, in input order, plus
/// whatever had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub items: Vec<T>,
    pub skipped: Vec<NormalizationError>,
}

// ── Listings ─────────────────────────────────────────────────────────

pub fn normalize_listing(
    raw: &RawDid,
    config: &NormalizerConfig,
) -> Result<PhoneNumber, NormalizationError> {
    let id = raw
        .id
        .as_ref()
        .and_then(didly_api::types::Scalar::to_text)
        .ok_or(NormalizationError::MissingField { field: "id" })?;
    let dialable = raw
        .phone_number
        .as_ref()
        .and_then(didly_api::types::Scalar::to_text)
        .ok_or(NormalizationError::MissingField {
            field: "phone_number",
        })?;

    let digits: String = dialable.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 3 {
        return Err(NormalizationError::InvalidField {
            field: "phone_number",
            value: dialable,
        });
    }

    let national = north_american_national(&digits);
    let friendly_number = national.map_or_else(|| dialable.clone(), format_north_american);
    let area_code = area_code(&digits);

    let number_type = match raw.number_type.as_deref().map(str::trim) {
        Some(kind) if !kind.is_empty() => kind.parse().unwrap_or_else(|_| {
            warn!(id = %id, kind = %kind, "unknown number type, treating as local");
            NumberType::Local
        }),
        _ if national.is_some() && TOLL_FREE_PREFIXES.contains(&area_code.as_str()) => {
            NumberType::TollFree
        }
        _ => NumberType::Local,
    };

    Ok(PhoneNumber {
        id,
        phone_number: canonical_dialable(&dialable, &digits),
        friendly_number,
        country: text_or_empty(raw.country.as_deref()).to_ascii_uppercase(),
        region: text_or_empty(raw.province_state.as_deref()),
        city: text_or_empty(raw.city.as_deref()),
        area_code,
        capabilities: capabilities(raw.capabilities.as_ref()),
        monthly_price: raw
            .monthly_fee
            .as_ref()
            .and_then(didly_api::types::Scalar::to_amount)
            .unwrap_or_default(),
        currency: config.currency.clone(),
        number_type,
    })
}

// ── Owned numbers ────────────────────────────────────────────────────

pub fn normalize_owned(
    raw: &RawDid,
    config: &NormalizerConfig,
) -> Result<OwnedPhoneNumber, NormalizationError> {
    let number = normalize_listing(raw, config)?;
    Ok(OwnedPhoneNumber {
        friendly_name: raw
            .friendly_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned),
        voice_enabled: raw.voice_enabled.unwrap_or(true),
        sms_enabled: raw.sms_enabled.unwrap_or(true),
        voice_config: raw.voice_config.as_ref().map(voice_config),
        sms_config: raw.sms_config.as_ref().map(sms_config),
        purchased_at: raw
            .purchased_at
            .as_deref()
            .and_then(|ts| parse_timestamp(&number.id, ts)),
        number,
    })
}

pub fn normalize_customer(raw: &RawCustomer) -> Result<Customer, NormalizationError> {
    let id = raw
        .id
        .as_ref()
        .and_then(didly_api::types::Scalar::to_text)
        .ok_or(NormalizationError::MissingField { field: "id" })?;
    Ok(Customer {
        id,
        name: text_or_empty(raw.name.as_deref()),
        email: raw
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_owned),
    })
}

/// Decode one element of a list response into its raw shape.
pub fn decode_record<T: DeserializeOwned>(
    record: &RawRecord<T>,
) -> Result<T, NormalizationError> {
    record.decode().map_err(|e| NormalizationError::Malformed {
        message: e.to_string(),
    })
}

/// Normalize every record, skipping (and logging) the ones that fail.
///
/// One bad record never takes the whole list down.
pub fn normalize_all<R, T>(
    raws: &[R],
    mut f: impl FnMut(&R) -> Result<T, NormalizationError>,
) -> Normalized<T> {
    let mut items = Vec::with_capacity(raws.len());
    let mut skipped = Vec::new();
    for raw in raws {
        match f(raw) {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!(error = %e, "skipping backend record");
                skipped.push(e);
            }
        }
    }
    Normalized { items, skipped }
}

// ── Derivations ──────────────────────────────────────────────────────

/// National significant number for North American numbers: 10 digits, or
/// 11 with the leading country code `1`.
fn north_american_national(digits: &str) -> Option<&str> {
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => digits.get(1..),
        _ => None,
    }
}

/// `4155551234` -> `415-555-1234`
fn format_north_american(national: &str) -> String {
    match (national.get(0..3), national.get(3..6), national.get(6..10)) {
        (Some(a), Some(b), Some(c)) => format!("{a}-{b}-{c}"),
        _ => national.to_owned(),
    }
}

/// First three significant digits.
///
/// A leading North American country code is not significant; any other
/// number uses its digit string as-is.
fn area_code(digits: &str) -> String {
    let significant = north_american_national(digits).unwrap_or(digits);
    significant.chars().take(3).collect()
}

/// E.164 form: `+` followed by the full digit string.
fn canonical_dialable(raw: &str, digits: &str) -> String {
    if raw.trim_start().starts_with('+') || digits.len() != 10 {
        format!("+{digits}")
    } else {
        format!("+1{digits}")
    }
}

fn capabilities(raw: Option<&RawCapabilities>) -> Capabilities {
    let policy = Capabilities::DEFAULT_POLICY;
    match raw {
        None => policy,
        Some(RawCapabilities::Flags { voice, sms, mms }) => Capabilities {
            voice: voice.unwrap_or(policy.voice),
            sms: sms.unwrap_or(policy.sms),
            mms: mms.unwrap_or(policy.mms),
        },
        Some(RawCapabilities::Names(names)) => {
            let has = |cap: &str| names.iter().any(|n| n.trim().eq_ignore_ascii_case(cap));
            Capabilities {
                voice: has("voice"),
                sms: has("sms"),
                mms: has("mms"),
            }
        }
    }
}

fn voice_config(raw: &RawVoiceConfig) -> VoiceConfig {
    VoiceConfig {
        forward_to_sip: raw.forward_to_sip.clone(),
        forward_to_webhook: raw.forward_to_webhook.clone(),
        voicemail_enabled: raw.voicemail_enabled.unwrap_or(false),
        voicemail_greeting: raw.voicemail_greeting.clone(),
    }
}

fn sms_config(raw: &RawSmsConfig) -> SmsConfig {
    SmsConfig {
        webhook_url: raw.webhook_url.clone(),
        auto_reply_enabled: raw.auto_reply_enabled.unwrap_or(false),
        auto_reply_message: raw.auto_reply_message.clone(),
    }
}

fn parse_timestamp(id: &str, ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    warn!(id = %id, ts = %ts, "unparseable purchase timestamp");
    None
}

fn text_or_empty(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use didly_api::types::Scalar;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn raw(value: serde_json::Value) -> RawDid {
        serde_json::from_value(value).unwrap()
    }

    fn cfg() -> NormalizerConfig {
        NormalizerConfig::default()
    }

    #[test]
    fn ten_digit_numbers_get_hyphenated() {
        let n = normalize_listing(
            &raw(json!({ "id": 1, "phone_number": "4155551234", "city": "San Francisco" })),
            &cfg(),
        )
        .unwrap();
        assert_eq!(n.friendly_number, "415-555-1234");
        assert_eq!(n.area_code, "415");
        assert_eq!(n.phone_number, "+14155551234");
        assert_eq!(n.id, "1");
    }

    #[test]
    fn e164_north_american_numbers_get_hyphenated() {
        let n = normalize_listing(
            &raw(json!({ "id": "4", "phoneNumber": "+12125559876" })),
            &cfg(),
        )
        .unwrap();
        assert_eq!(n.friendly_number, "212-555-9876");
        assert_eq!(n.area_code, "212");
        assert_eq!(n.phone_number, "+12125559876");
    }

    #[test]
    fn other_lengths_pass_through_unformatted() {
        let n = normalize_listing(
            &raw(json!({ "id": 6, "phone_number": "+442071234567", "country": "gb" })),
            &cfg(),
        )
        .unwrap();
        assert_eq!(n.friendly_number, "+442071234567");
        assert_eq!(n.area_code, "442");
        assert_eq!(n.country, "GB");
    }

    #[test]
    fn missing_identity_fields_fail() {
        assert_eq!(
            normalize_listing(&raw(json!({ "phone_number": "4155551234" })), &cfg()),
            Err(NormalizationError::MissingField { field: "id" })
        );
        assert_eq!(
            normalize_listing(&raw(json!({ "id": 1 })), &cfg()),
            Err(NormalizationError::MissingField {
                field: "phone_number"
            })
        );
        assert_eq!(
            normalize_listing(&raw(json!({ "id": 1, "phone_number": "  " })), &cfg()),
            Err(NormalizationError::MissingField {
                field: "phone_number"
            })
        );
    }

    #[test]
    fn capabilities_default_by_policy() {
        let n = normalize_listing(
            &raw(json!({ "id": 1, "phone_number": "4155551234" })),
            &cfg(),
        )
        .unwrap();
        assert_eq!(n.capabilities, Capabilities::DEFAULT_POLICY);

        let partial = normalize_listing(
            &raw(json!({ "id": 1, "phone_number": "4155551234", "capabilities": { "mms": true } })),
            &cfg(),
        )
        .unwrap();
        assert!(partial.capabilities.voice && partial.capabilities.sms && partial.capabilities.mms);

        let listed = normalize_listing(
            &raw(json!({ "id": 1, "phone_number": "4155551234", "capabilities": ["voice"] })),
            &cfg(),
        )
        .unwrap();
        assert!(listed.capabilities.voice);
        assert!(!listed.capabilities.sms);
    }

    #[test]
    fn currency_comes_from_config_not_record() {
        let config = NormalizerConfig {
            currency: "CAD".into(),
        };
        let n = normalize_listing(
            &raw(json!({ "id": 7, "phone_number": "4165558888", "monthly_fee": "1.25" })),
            &config,
        )
        .unwrap();
        assert_eq!(n.currency, "CAD");
        assert!((n.monthly_price - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn toll_free_is_inferred_from_prefix_when_unreported() {
        let n = normalize_listing(
            &raw(json!({ "id": 3, "phone_number": "8005551000" })),
            &cfg(),
        )
        .unwrap();
        assert_eq!(n.number_type, NumberType::TollFree);

        let reported = normalize_listing(
            &raw(json!({ "id": 3, "phone_number": "4155551000", "type": "mobile" })),
            &cfg(),
        )
        .unwrap();
        assert_eq!(reported.number_type, NumberType::Mobile);
    }

    #[test]
    fn owned_records_carry_configuration() {
        let owned = normalize_owned(
            &raw(json!({
                "id": 2,
                "phone_number": "4155555555",
                "description": "Support line",
                "sms_enabled": false,
                "smsConfig": { "autoReplyEnabled": true },
                "purchased_at": "2024-05-01T12:00:00Z"
            })),
            &cfg(),
        )
        .unwrap();
        assert_eq!(owned.friendly_name.as_deref(), Some("Support line"));
        assert!(owned.voice_enabled);
        assert!(!owned.sms_enabled);
        assert_eq!(
            owned.sms_config,
            Some(SmsConfig {
                webhook_url: None,
                auto_reply_enabled: true,
                auto_reply_message: None,
            })
        );
        assert!(owned.voice_config.is_none());
        assert_eq!(
            owned.purchased_at.unwrap().to_rfc3339(),
            "2024-05-01T12:00:00+00:00"
        );
    }

    #[test]
    fn bad_records_are_skipped_not_fatal() {
        let raws = vec![
            raw(json!({ "id": 1, "phone_number": "4155551234" })),
            raw(json!({ "phone_number": "4155559999" })),
            raw(json!({ "id": 3, "phone_number": "2125559876" })),
        ];
        let out = normalize_all(&raws, |r| normalize_listing(r, &cfg()));
        let ids: Vec<_> = out.items.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn numeric_phone_numbers_are_accepted() {
        let r = RawDid {
            id: Some(Scalar::Int(9)),
            phone_number: Some(Scalar::Int(4_155_550_000)),
            ..RawDid::default()
        };
        let n = normalize_listing(&r, &cfg()).unwrap();
        assert_eq!(n.friendly_number, "415-555-0000");
    }

    #[test]
    fn customers_normalize() {
        let c = normalize_customer(&RawCustomer {
            id: Some(Scalar::Text("c-1".into())),
            name: Some(" Acme ".into()),
            email: Some(String::new()),
            ..RawCustomer::default()
        })
        .unwrap();
        assert_eq!(c.name, "Acme");
        assert_eq!(c.email, None);
    }
}
