//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use didly_core::NumberType;

use crate::cli::NumberTypeArg;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, refuses instead of guessing.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Io(std::io::Error::other(format!("prompt failed: {e}")))
}

/// Spinner on stderr while a request runs. Hidden when stderr is not a
/// terminal or output is quiet.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn number_type(arg: NumberTypeArg) -> NumberType {
    match arg {
        NumberTypeArg::Local => NumberType::Local,
        NumberTypeArg::TollFree => NumberType::TollFree,
        NumberTypeArg::Mobile => NumberType::Mobile,
    }
}

/// Print skipped-record warnings collected by the session.
pub async fn report_skipped(session: &didly_core::Session, quiet: bool) {
    let warnings = session.take_warnings().await;
    if quiet || warnings.is_empty() {
        return;
    }
    eprintln!(
        "warning: skipped {} malformed record(s) from the backend",
        warnings.len()
    );
    for w in warnings {
        tracing::debug!(warning = %w, "skipped record");
    }
}
