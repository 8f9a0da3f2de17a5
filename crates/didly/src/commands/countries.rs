//! Country catalog command handler. Purely local, no backend needed.

use tabled::Tabled;

use didly_core::{Country, countries};

use crate::cli::GlobalOpts;
use crate::output;

#[derive(Tabled)]
struct CountryRow {
    #[tabled(rename = "Code")]
    code: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Flag")]
    flag: &'static str,
}

impl From<&Country> for CountryRow {
    fn from(c: &Country) -> Self {
        Self {
            code: c.code,
            name: c.name,
            flag: c.flag,
        }
    }
}

pub fn handle(global: &GlobalOpts) {
    let out = output::render_list(global.output, countries(), |c| CountryRow::from(c), |c| {
        c.code.to_owned()
    });
    output::print_output(&out, global.quiet);
}
