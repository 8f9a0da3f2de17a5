// Backend wire types
//
// The provisioning backend has shipped several record shapes over time
// (snake_case provider fields, camelCase app fields, bare or wrapped lists).
// Everything here is deliberately loose: every field is optional and the
// common spellings are accepted as aliases. Validation happens in
// `didly-core`'s normalizer, which turns these into domain values or a
// `NormalizationError`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ── Scalars ──────────────────────────────────────────────────────────

/// A value the backend sends either as a JSON string or a JSON number.
///
/// Identifiers and dialable numbers both show up in either form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    /// Render as a string, trimming surrounding whitespace.
    ///
    /// Returns `None` for empty strings so callers can treat them as absent.
    pub fn to_text(&self) -> Option<String> {
        let s = match self {
            Self::Text(s) => s.trim().to_owned(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
        };
        if s.is_empty() { None } else { Some(s) }
    }

    /// Interpret as a decimal amount (`"1.00"` and `1` both work).
    pub fn to_amount(&self) -> Option<f64> {
        match self {
            Self::Text(s) => s.trim().trim_start_matches('$').parse().ok(),
            #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
        }
    }
}

// ── List envelope ────────────────────────────────────────────────────

/// A collection response: either a bare JSON array or an object wrapping it.
///
/// ```json
/// [ {...}, {...} ]
/// { "data": [ {...} ] }
/// { "dids": [ {...} ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawList<T> {
    Wrapped {
        #[serde(alias = "dids", alias = "results", alias = "items", alias = "customers")]
        data: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> RawList<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// A single-record response: either the record itself or `{ "did": {...} }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawOne<T> {
    Wrapped {
        #[serde(alias = "data")]
        did: T,
    },
    Bare(T),
}

impl<T> RawOne<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { did } | Self::Bare(did) => did,
        }
    }
}

// ── Deferred record ──────────────────────────────────────────────────

/// One element of a list response, kept as JSON until the caller asks
/// for it.
///
/// List bodies are decoded element by element so a single record with an
/// unexpected shape can be skipped instead of failing the whole response.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent, bound = "")]
pub struct RawRecord<T> {
    value: serde_json::Value,
    #[serde(skip)]
    _kind: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> RawRecord<T> {
    pub fn decode(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }
}

impl<T> RawRecord<T> {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.value
    }
}

impl<T> From<serde_json::Value> for RawRecord<T> {
    fn from(value: serde_json::Value) -> Self {
        Self {
            value,
            _kind: PhantomData,
        }
    }
}

// ── DID record ───────────────────────────────────────────────────────

/// A DID record as returned by search, provision, list, and update.
///
/// Available listings and owned numbers share this shape; owned records
/// just fill in more of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDid {
    #[serde(default, alias = "did_id", alias = "didId")]
    pub id: Option<Scalar>,
    #[serde(default, alias = "phoneNumber", alias = "number", alias = "did")]
    pub phone_number: Option<Scalar>,
    #[serde(default, alias = "country_code", alias = "countryCode")]
    pub country: Option<String>,
    #[serde(default, alias = "region", alias = "provinceState", alias = "state")]
    pub province_state: Option<String>,
    #[serde(default, alias = "rate_center")]
    pub city: Option<String>,
    #[serde(default)]
    pub capabilities: Option<RawCapabilities>,
    #[serde(default, alias = "monthlyPrice", alias = "monthly_price")]
    pub monthly_fee: Option<Scalar>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, alias = "type", alias = "numberType")]
    pub number_type: Option<String>,

    // ── Owned-only fields ──
    #[serde(default, alias = "friendlyName", alias = "description")]
    pub friendly_name: Option<String>,
    #[serde(default, alias = "voiceEnabled")]
    pub voice_enabled: Option<bool>,
    #[serde(default, alias = "smsEnabled")]
    pub sms_enabled: Option<bool>,
    #[serde(default, alias = "voiceConfig")]
    pub voice_config: Option<RawVoiceConfig>,
    #[serde(default, alias = "smsConfig")]
    pub sms_config: Option<RawSmsConfig>,
    #[serde(default, alias = "purchasedAt", alias = "created_at", alias = "createdAt")]
    pub purchased_at: Option<String>,

    /// Catch-all for provider-specific fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Capability report: either a flag object or a list of names.
///
/// ```json
/// { "voice": true, "sms": true, "mms": false }
/// [ "voice", "sms" ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCapabilities {
    Flags {
        #[serde(default)]
        voice: Option<bool>,
        #[serde(default)]
        sms: Option<bool>,
        #[serde(default)]
        mms: Option<bool>,
    },
    Names(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVoiceConfig {
    #[serde(default, alias = "forwardToSip")]
    pub forward_to_sip: Option<String>,
    #[serde(default, alias = "forwardToWebhook")]
    pub forward_to_webhook: Option<String>,
    #[serde(default, alias = "voicemailEnabled")]
    pub voicemail_enabled: Option<bool>,
    #[serde(default, alias = "voicemailGreeting")]
    pub voicemail_greeting: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSmsConfig {
    #[serde(default, alias = "webhookUrl")]
    pub webhook_url: Option<String>,
    #[serde(default, alias = "autoReplyEnabled")]
    pub auto_reply_enabled: Option<bool>,
    #[serde(default, alias = "autoReplyMessage")]
    pub auto_reply_message: Option<String>,
}

// ── Customers ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCustomer {
    #[serde(default, alias = "customer_id", alias = "customerId")]
    pub id: Option<Scalar>,
    #[serde(default, alias = "full_name", alias = "company")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Health ───────────────────────────────────────────────────────────

/// Body of `GET /health`. Any 2xx counts as healthy; the body is advisory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

// ── Requests ─────────────────────────────────────────────────────────

/// Query parameters for `GET /dids/search`.
///
/// Absent fields are omitted from the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub area_code: Option<String>,
    pub city: Option<String>,
    pub pattern: Option<String>,
    pub number_type: Option<String>,
    pub country: Option<String>,
}

impl SearchQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        [
            ("area_code", &self.area_code),
            ("city", &self.city),
            ("pattern", &self.pattern),
            ("type", &self.number_type),
            ("country", &self.country),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_owned()))
        })
        .collect()
    }
}

/// Body of `POST /dids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionRequest {
    pub did_id: String,
    pub routing: String,
    pub description: String,
}

/// Body of `PUT /dids/{id}`: exactly the fields the caller set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateDidRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_config: Option<VoiceConfigPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_config: Option<SmsConfigPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoiceConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_to_sip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_to_webhook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voicemail_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voicemail_greeting: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmsConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reply_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reply_message: Option<String>,
}
