//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::SecretString;

use didly_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const REDACTED: &str = "********";

/// Copy of the config safe to print: plaintext tokens are masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
    cfg
}

fn read_token(prompt: &str) -> Result<SecretString, CliError> {
    let token = rpassword::prompt_password(prompt).map_err(prompt_err)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "API token cannot be empty".into(),
        });
    }
    Ok(SecretString::from(token.to_owned()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = didly_config::config_path();
            eprintln!("didly configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Backend URL")
                .validate_with(|v: &String| {
                    didly_config::parse_api_url(v)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let currency: String = Input::new()
                .with_prompt("Billing currency")
                .default("USD".into())
                .interact_text()
                .map_err(prompt_err)?;

            let token = read_token("API token: ")?;

            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the API token?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let plaintext = if store_selection == 0 {
                didly_config::store_token(&profile_name, &token)?;
                eprintln!("   ✓ Token stored in system keyring");
                None
            } else {
                use secrecy::ExposeSecret;
                Some(token.expose_secret().to_owned())
            };

            let profile = Profile {
                api_url,
                token: plaintext,
                currency: Some(currency.trim().to_ascii_uppercase()),
                ..Profile::default()
            };

            let mut cfg = didly_config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let path = didly_config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: didly health");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&didly_config::load_config_or_default());
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n({e})")),
                |c| c.default_profile.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set token ───────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = didly_config::load_config_or_default();
            let name = profile
                .or_else(|| global.profile.clone())
                .unwrap_or_else(|| config::active_profile_name(global, &cfg));
            let token = read_token(&format!("API token for '{name}': "))?;
            didly_config::store_token(&name, &token)?;
            output::status(&format!("✓ Token for '{name}' stored in system keyring"), global.quiet);
            Ok(())
        }

        // ── Use ─────────────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = didly_config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            didly_config::save_config(&cfg)?;
            output::status(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn show_never_prints_plaintext_tokens() {
        let cfg = Config {
            profiles: HashMap::from([(
                "prod".to_owned(),
                Profile {
                    api_url: "https://api.example.com".into(),
                    token: Some("s3cret".into()),
                    ..Profile::default()
                },
            )]),
            ..Config::default()
        };
        let shown = redacted(&cfg);
        assert_eq!(shown.profiles["prod"].token.as_deref(), Some(REDACTED));
        assert_eq!(cfg.profiles["prod"].token.as_deref(), Some("s3cret"));
    }
}
