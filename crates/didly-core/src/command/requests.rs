// ── Configuration update payloads ──
//
// `ConfigUpdate` carries exactly the fields a caller wants to change.
// Absent fields are left alone, both on the wire and when merged locally.

use serde::{Deserialize, Serialize};
use url::Url;

use didly_api::types::{SmsConfigPatch, UpdateDidRequest, VoiceConfigPatch};

use crate::error::CoreError;
use crate::model::{OwnedPhoneNumber, SmsConfig, VoiceConfig};

const MAX_AUTO_REPLY_LEN: usize = 160;
const MAX_FRIENDLY_NAME_LEN: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_config: Option<VoiceConfigUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_config: Option<SmsConfigUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_to_sip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_to_webhook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voicemail_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voicemail_greeting: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reply_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reply_message: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Local checks run before anything is sent.
    ///
    /// Empty strings are allowed everywhere: they clear the field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.friendly_name {
            if name.chars().count() > MAX_FRIENDLY_NAME_LEN {
                return Err(CoreError::validation(
                    "friendly name",
                    format!("at most {MAX_FRIENDLY_NAME_LEN} characters"),
                ));
            }
        }
        if let Some(voice) = &self.voice_config {
            if let Some(sip) = non_blank(voice.forward_to_sip.as_deref()) {
                let lower = sip.to_ascii_lowercase();
                if !(lower.starts_with("sip:") || lower.starts_with("sips:")) {
                    return Err(CoreError::validation(
                        "SIP target",
                        "must start with `sip:` or `sips:`",
                    ));
                }
            }
            if let Some(hook) = non_blank(voice.forward_to_webhook.as_deref()) {
                check_webhook("voice webhook", hook)?;
            }
        }
        if let Some(sms) = &self.sms_config {
            if let Some(hook) = non_blank(sms.webhook_url.as_deref()) {
                check_webhook("SMS webhook", hook)?;
            }
            if let Some(msg) = &sms.auto_reply_message {
                if msg.chars().count() > MAX_AUTO_REPLY_LEN {
                    return Err(CoreError::validation(
                        "auto-reply message",
                        format!("at most {MAX_AUTO_REPLY_LEN} characters"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Wire body for `PUT /dids/{id}`.
    pub fn to_request(&self) -> UpdateDidRequest {
        UpdateDidRequest {
            friendly_name: self.friendly_name.clone(),
            voice_enabled: self.voice_enabled,
            sms_enabled: self.sms_enabled,
            voice_config: self.voice_config.as_ref().map(|v| VoiceConfigPatch {
                forward_to_sip: v.forward_to_sip.clone(),
                forward_to_webhook: v.forward_to_webhook.clone(),
                voicemail_enabled: v.voicemail_enabled,
                voicemail_greeting: v.voicemail_greeting.clone(),
            }),
            sms_config: self.sms_config.as_ref().map(|s| SmsConfigPatch {
                webhook_url: s.webhook_url.clone(),
                auto_reply_enabled: s.auto_reply_enabled,
                auto_reply_message: s.auto_reply_message.clone(),
            }),
        }
    }

    /// Merge into a local record. Fields not present are preserved; an
    /// empty string clears an optional field.
    pub fn apply_to(&self, owned: &mut OwnedPhoneNumber) {
        if let Some(name) = &self.friendly_name {
            owned.friendly_name = cleared(name);
        }
        if let Some(v) = self.voice_enabled {
            owned.voice_enabled = v;
        }
        if let Some(v) = self.sms_enabled {
            owned.sms_enabled = v;
        }
        if let Some(patch) = &self.voice_config {
            let voice = owned.voice_config.get_or_insert_with(VoiceConfig::default);
            if let Some(sip) = &patch.forward_to_sip {
                voice.forward_to_sip = cleared(sip);
            }
            if let Some(hook) = &patch.forward_to_webhook {
                voice.forward_to_webhook = cleared(hook);
            }
            if let Some(v) = patch.voicemail_enabled {
                voice.voicemail_enabled = v;
            }
            if let Some(greeting) = &patch.voicemail_greeting {
                voice.voicemail_greeting = cleared(greeting);
            }
        }
        if let Some(patch) = &self.sms_config {
            let sms = owned.sms_config.get_or_insert_with(SmsConfig::default);
            if let Some(hook) = &patch.webhook_url {
                sms.webhook_url = cleared(hook);
            }
            if let Some(v) = patch.auto_reply_enabled {
                sms.auto_reply_enabled = v;
            }
            if let Some(msg) = &patch.auto_reply_message {
                sms.auto_reply_message = cleared(msg);
            }
        }
    }
}

// ── Config form ──────────────────────────────────────────────────────

/// Editable state of the configuration dialog.
///
/// Text fields are plain strings (empty = unset). The voice section only
/// applies to voice-capable numbers and the SMS section to SMS-capable ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ConfigForm {
    pub friendly_name: String,
    pub voice_enabled: bool,
    pub sms_enabled: bool,
    pub forward_to_sip: String,
    pub forward_to_webhook: String,
    pub voicemail_enabled: bool,
    pub sms_webhook_url: String,
    pub auto_reply_enabled: bool,
    pub auto_reply_message: String,
}

impl ConfigForm {
    pub fn from_owned(owned: &OwnedPhoneNumber) -> Self {
        let voice = owned.voice_config.clone().unwrap_or_default();
        let sms = owned.sms_config.clone().unwrap_or_default();
        Self {
            friendly_name: owned.friendly_name.clone().unwrap_or_default(),
            voice_enabled: owned.voice_enabled,
            sms_enabled: owned.sms_enabled,
            forward_to_sip: voice.forward_to_sip.unwrap_or_default(),
            forward_to_webhook: voice.forward_to_webhook.unwrap_or_default(),
            voicemail_enabled: voice.voicemail_enabled,
            sms_webhook_url: sms.webhook_url.unwrap_or_default(),
            auto_reply_enabled: sms.auto_reply_enabled,
            auto_reply_message: sms.auto_reply_message.unwrap_or_default(),
        }
    }

    /// Only what changed relative to `owned`, respecting capabilities.
    pub fn to_update(&self, owned: &OwnedPhoneNumber) -> ConfigUpdate {
        let base = Self::from_owned(owned);
        let caps = owned.number.capabilities;

        let mut update = ConfigUpdate {
            friendly_name: changed(&base.friendly_name, &self.friendly_name),
            ..ConfigUpdate::default()
        };

        if caps.voice {
            update.voice_enabled = changed(&base.voice_enabled, &self.voice_enabled);
            let voice = VoiceConfigUpdate {
                forward_to_sip: changed(&base.forward_to_sip, &self.forward_to_sip),
                forward_to_webhook: changed(&base.forward_to_webhook, &self.forward_to_webhook),
                voicemail_enabled: changed(&base.voicemail_enabled, &self.voicemail_enabled),
                voicemail_greeting: None,
            };
            if voice != VoiceConfigUpdate::default() {
                update.voice_config = Some(voice);
            }
        }

        if caps.sms {
            update.sms_enabled = changed(&base.sms_enabled, &self.sms_enabled);
            let sms = SmsConfigUpdate {
                webhook_url: changed(&base.sms_webhook_url, &self.sms_webhook_url),
                auto_reply_enabled: changed(&base.auto_reply_enabled, &self.auto_reply_enabled),
                auto_reply_message: changed(&base.auto_reply_message, &self.auto_reply_message),
            };
            if sms != SmsConfigUpdate::default() {
                update.sms_config = Some(sms);
            }
        }

        update
    }
}

fn changed<T: PartialEq + Clone>(before: &T, after: &T) -> Option<T> {
    (before != after).then(|| after.clone())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn cleared(value: &str) -> Option<String> {
    non_blank(Some(value)).map(str::to_owned)
}

fn check_webhook(field: &str, value: &str) -> Result<(), CoreError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(CoreError::validation(field, "must be an http(s) URL")),
        Err(e) => Err(CoreError::validation(field, e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::backend::memory::fixture_listings;

    fn owned(index: usize) -> OwnedPhoneNumber {
        let listing = fixture_listings("USD").swap_remove(index);
        OwnedPhoneNumber::purchased(listing, chrono::Utc::now())
    }

    #[test]
    fn auto_reply_patch_creates_sms_config_and_leaves_voice_alone() {
        let mut number = owned(0);
        number.voice_config = Some(VoiceConfig {
            forward_to_sip: Some("sip:front@pbx.example".into()),
            ..VoiceConfig::default()
        });
        let voice_before = number.voice_config.clone();

        let update = ConfigUpdate {
            sms_config: Some(SmsConfigUpdate {
                auto_reply_enabled: Some(true),
                ..SmsConfigUpdate::default()
            }),
            ..ConfigUpdate::default()
        };
        update.apply_to(&mut number);

        assert_eq!(
            number.sms_config,
            Some(SmsConfig {
                webhook_url: None,
                auto_reply_enabled: true,
                auto_reply_message: None,
            })
        );
        assert_eq!(number.voice_config, voice_before);
    }

    #[test]
    fn sip_and_webhook_forwarding_may_coexist() {
        let update = ConfigUpdate {
            voice_config: Some(VoiceConfigUpdate {
                forward_to_sip: Some("sip:desk@pbx.example".into()),
                forward_to_webhook: Some("https://hooks.example/voice".into()),
                ..VoiceConfigUpdate::default()
            }),
            ..ConfigUpdate::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn invalid_inputs_are_rejected_locally() {
        let bad_sip = ConfigUpdate {
            voice_config: Some(VoiceConfigUpdate {
                forward_to_sip: Some("desk@pbx".into()),
                ..VoiceConfigUpdate::default()
            }),
            ..ConfigUpdate::default()
        };
        assert!(matches!(bad_sip.validate(), Err(CoreError::Validation { .. })));

        let bad_hook = ConfigUpdate {
            sms_config: Some(SmsConfigUpdate {
                webhook_url: Some("ftp://files.example".into()),
                ..SmsConfigUpdate::default()
            }),
            ..ConfigUpdate::default()
        };
        assert!(matches!(bad_hook.validate(), Err(CoreError::Validation { .. })));

        let long_reply = ConfigUpdate {
            sms_config: Some(SmsConfigUpdate {
                auto_reply_message: Some("x".repeat(161)),
                ..SmsConfigUpdate::default()
            }),
            ..ConfigUpdate::default()
        };
        assert!(long_reply.validate().is_err());
    }

    #[test]
    fn request_carries_only_provided_fields() {
        let update = ConfigUpdate {
            friendly_name: Some("Sales".into()),
            ..ConfigUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(update.to_request()).unwrap(),
            json!({ "friendly_name": "Sales" })
        );
    }

    #[test]
    fn empty_strings_clear_fields() {
        let mut number = owned(0);
        number.friendly_name = Some("Old".into());
        ConfigUpdate {
            friendly_name: Some(String::new()),
            ..ConfigUpdate::default()
        }
        .apply_to(&mut number);
        assert_eq!(number.friendly_name, None);
    }

    #[test]
    fn unchanged_form_produces_empty_update() {
        let number = owned(0);
        let form = ConfigForm::from_owned(&number);
        assert!(form.to_update(&number).is_empty());
    }

    #[test]
    fn form_diff_respects_capabilities() {
        // Fixture 3 is voice-only.
        let number = owned(2);
        assert!(!number.number.capabilities.sms);

        let mut form = ConfigForm::from_owned(&number);
        form.friendly_name = "Hotline".into();
        form.voicemail_enabled = true;
        form.auto_reply_enabled = true;

        let update = form.to_update(&number);
        assert_eq!(update.friendly_name.as_deref(), Some("Hotline"));
        assert_eq!(
            update.voice_config,
            Some(VoiceConfigUpdate {
                voicemail_enabled: Some(true),
                ..VoiceConfigUpdate::default()
            })
        );
        assert_eq!(update.sms_config, None);
    }
}
