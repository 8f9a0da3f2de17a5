//! Command dispatch: bridges CLI args -> session calls -> output formatting.

pub mod buy;
pub mod config_cmd;
pub mod countries;
pub mod customers;
pub mod health;
pub mod numbers;
pub mod search;
pub mod util;

use didly_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Search(args) => search::handle(session, args, global).await,
        Command::Buy(args) => buy::handle(session, args, global).await,
        Command::Numbers(args) => numbers::handle(session, args, global).await,
        Command::Health(args) => health::handle(session, args, global).await,
        Command::Customers(args) => customers::handle(session, args, global).await,
        // Local commands are handled before a session exists
        Command::Countries | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Internal {
                message: "local command reached backend dispatch".into(),
            })
        }
    }
}
