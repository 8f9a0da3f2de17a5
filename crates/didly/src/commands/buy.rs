//! Purchase command handler.

use didly_core::{Command as CoreCommand, CommandResult, SearchFilters, Session};

use crate::cli::{BuyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{numbers, util};

pub async fn handle(session: &Session, args: BuyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Look the listing up so the prompt can show number and price.
    let listing = session
        .search(&SearchFilters::default())
        .await?
        .into_iter()
        .find(|n| n.id == args.id);

    let prompt = listing.as_ref().map_or_else(
        || format!("Purchase number {}?", args.id),
        didly_core::PhoneNumber::purchase_prompt,
    );
    if !util::confirm(&prompt, "buy", global.yes)? {
        output::status("Purchase cancelled.", global.quiet);
        return Ok(());
    }

    let command = CoreCommand::Purchase { id: args.id };
    let success = command.success_message();
    let pb = util::spinner("Purchasing...", global.quiet);
    let result = session.execute(command).await;
    pb.finish_and_clear();

    let CommandResult::Purchased(owned) = result? else {
        return Err(CliError::Internal {
            message: "unexpected result for purchase".into(),
        });
    };
    output::status(success, global.quiet);
    numbers::print_owned(&owned, global);
    Ok(())
}
