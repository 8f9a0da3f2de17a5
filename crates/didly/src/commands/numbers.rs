//! Owned-number command handlers.

use tabled::Tabled;

use didly_core::{
    Command as CoreCommand, CommandResult, ConfigUpdate, OwnedPhoneNumber, Session,
    SmsConfigUpdate, VoiceConfigUpdate, filter_owned,
};

use crate::cli::{ConfigureArgs, GlobalOpts, NumbersArgs, NumbersCommand};
use crate::error::CliError;
use crate::output;

use super::{search, util};

#[derive(Tabled)]
struct OwnedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Voice")]
    voice: &'static str,
    #[tabled(rename = "SMS")]
    sms: &'static str,
    #[tabled(rename = "Purchased")]
    purchased: String,
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

impl From<&std::sync::Arc<OwnedPhoneNumber>> for OwnedRow {
    fn from(n: &std::sync::Arc<OwnedPhoneNumber>) -> Self {
        Self {
            id: n.id().to_owned(),
            number: n.number.friendly_number.clone(),
            name: n.friendly_name.clone().unwrap_or_default(),
            location: search::location(&n.number),
            voice: on_off(n.voice_enabled),
            sms: on_off(n.sms_enabled),
            purchased: n
                .purchased_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

fn detail(n: &OwnedPhoneNumber) -> String {
    let voice = n.voice_config.clone().unwrap_or_default();
    let sms = n.sms_config.clone().unwrap_or_default();
    let or_dash = |v: Option<String>| v.filter(|s| !s.is_empty()).unwrap_or_else(|| "-".into());

    output::detail_block(&[
        ("ID", n.id().to_owned()),
        ("Number", n.number.friendly_number.clone()),
        ("Name", n.display_name().to_owned()),
        ("Location", search::location(&n.number)),
        ("Type", n.number.number_type.to_string()),
        ("Capabilities", n.number.capabilities.labels()),
        ("Monthly", n.number.price_label()),
        ("Voice", on_off(n.voice_enabled).into()),
        ("  SIP target", or_dash(voice.forward_to_sip)),
        ("  Webhook", or_dash(voice.forward_to_webhook)),
        ("  Voicemail", on_off(voice.voicemail_enabled).into()),
        ("SMS", on_off(n.sms_enabled).into()),
        ("  Webhook", or_dash(sms.webhook_url)),
        ("  Auto-reply", on_off(sms.auto_reply_enabled).into()),
        ("  Message", or_dash(sms.auto_reply_message)),
        (
            "Purchased",
            n.purchased_at
                .map_or_else(|| "-".into(), |t| t.to_rfc3339()),
        ),
    ])
}

/// Render one owned number in the selected format.
pub(super) fn print_owned(n: &OwnedPhoneNumber, global: &GlobalOpts) {
    let out = output::render_single(global.output, n, detail, |n| n.id().to_owned());
    output::print_output(&out, global.quiet);
}

fn not_found() -> CliError {
    CliError::NotFound {
        message: "Number not found".into(),
    }
}

pub async fn handle(
    session: &Session,
    args: NumbersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NumbersCommand::List { filter } => {
            let owned = session.refresh_owned().await?;
            util::report_skipped(session, global.quiet).await;
            let visible = filter_owned(&owned, filter.as_deref().unwrap_or(""));
            let out = output::render_list(global.output, &visible, |n| OwnedRow::from(n), |n| {
                n.id().to_owned()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NumbersCommand::Get { id } => {
            session.refresh_owned().await?;
            let owned = session.store().get(&id).ok_or_else(not_found)?;
            print_owned(&owned, global);
            Ok(())
        }

        NumbersCommand::Configure(args) => {
            let id = args.id.clone();
            let update = update_from_args(args);
            if update.is_empty() {
                return Err(CliError::Validation {
                    field: "configure".into(),
                    reason: "nothing to change; pass at least one setting flag".into(),
                });
            }
            update.validate()?;

            session.refresh_owned().await?;
            let prompt = session.store().get(&id).map_or_else(
                || format!("Save configuration for number {id}?"),
                |n| format!("Save configuration for {}?", n.number.friendly_number),
            );
            if !util::confirm(&prompt, "configure", global.yes)? {
                output::status("Configuration unchanged.", global.quiet);
                return Ok(());
            }

            let command = CoreCommand::UpdateConfig { id, update };
            let success = command.success_message();
            let CommandResult::Updated(owned) = session.execute(command).await? else {
                return Err(CliError::Internal {
                    message: "unexpected result for update".into(),
                });
            };
            output::status(success, global.quiet);
            print_owned(&owned, global);
            Ok(())
        }

        NumbersCommand::Release { id } => {
            session.refresh_owned().await?;
            let prompt = session.store().get(&id).map_or_else(
                || format!("Are you sure you want to release number {id}? This action cannot be undone."),
                |n| n.release_prompt(),
            );
            if !util::confirm(&prompt, "release", global.yes)? {
                output::status("Release cancelled.", global.quiet);
                return Ok(());
            }
            let command = CoreCommand::Release { id };
            let success = command.success_message();
            session.execute(command).await?;
            output::status(success, global.quiet);
            Ok(())
        }
    }
}

/// Only flags the user passed end up in the update.
fn update_from_args(args: ConfigureArgs) -> ConfigUpdate {
    let voice = VoiceConfigUpdate {
        forward_to_sip: args.sip_target,
        forward_to_webhook: args.voice_webhook,
        voicemail_enabled: args.voicemail,
        voicemail_greeting: args.voicemail_greeting,
    };
    let sms = SmsConfigUpdate {
        webhook_url: args.sms_webhook,
        auto_reply_enabled: args.auto_reply,
        auto_reply_message: args.auto_reply_message,
    };
    ConfigUpdate {
        friendly_name: args.name,
        voice_enabled: args.voice,
        sms_enabled: args.sms,
        voice_config: (voice != VoiceConfigUpdate::default()).then_some(voice),
        sms_config: (sms != SmsConfigUpdate::default()).then_some(sms),
    }
}
