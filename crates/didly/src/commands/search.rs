//! Search command handler.

use tabled::Tabled;

use didly_core::{PhoneNumber, SearchFilters, Session};

use crate::cli::{GlobalOpts, SearchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
pub(super) struct ListingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Capabilities")]
    capabilities: String,
    #[tabled(rename = "Monthly")]
    price: String,
}

impl From<&PhoneNumber> for ListingRow {
    fn from(n: &PhoneNumber) -> Self {
        Self {
            id: n.id.clone(),
            number: n.friendly_number.clone(),
            location: location(n),
            kind: n.number_type.to_string(),
            capabilities: n.capabilities.labels(),
            price: n.price_label(),
        }
    }
}

pub(super) fn location(n: &PhoneNumber) -> String {
    [n.city.as_str(), n.region.as_str(), n.country.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn handle(
    session: &Session,
    args: SearchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let filters = SearchFilters {
        country: args.country,
        area_code: args.area_code,
        city: args.city,
        pattern: args.pattern,
        number_type: args.number_type.map(util::number_type),
    };

    let pb = util::spinner("Searching numbers...", global.quiet);
    let results = session.search(&filters).await;
    pb.finish_and_clear();
    let results = results?;
    util::report_skipped(session, global.quiet).await;

    if results.is_empty() && global.output == crate::cli::OutputFormat::Table {
        output::status("No numbers match those filters.", global.quiet);
        return Ok(());
    }

    let out = output::render_list(global.output, &results, |n| ListingRow::from(n), |n| {
        n.id.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
