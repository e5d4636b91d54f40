//! Events subcommand: the closed event table.

use serde::Serialize;
use tabled::Tabled;

use stalink_core::EventBase;
use stalink_core::registry::EVENTS;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct EventEntry {
    name: &'static str,
    source: &'static str,
    id: i32,
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Event")]
    name: &'static str,
    #[tabled(rename = "Source")]
    source: &'static str,
    #[tabled(rename = "Id")]
    id: i32,
}

fn source_name(base: EventBase) -> &'static str {
    match base {
        EventBase::Wifi => "wifi",
        EventBase::Ip => "ip",
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config(global)?;
    let format = config::output_format(global, &cfg);

    let entries: Vec<EventEntry> = EVENTS
        .iter()
        .map(|desc| EventEntry {
            name: desc.kind.name(),
            source: source_name(desc.base),
            id: desc.id,
        })
        .collect();

    let rendered = output::render_list(format, &entries, |e| EventRow {
        name: e.name,
        source: e.source,
        id: e.id,
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
