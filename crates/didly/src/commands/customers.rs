//! Customer command handlers.

use tabled::Tabled;

use didly_core::{Customer, Session};

use crate::cli::{CustomersArgs, CustomersCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&Customer> for CustomerRow {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            email: c.email.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(
    session: &Session,
    args: CustomersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CustomersCommand::List => {
            let customers = session.customers().await?;
            let out = output::render_list(global.output, &customers, |c| CustomerRow::from(c), |c| {
                c.id.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
