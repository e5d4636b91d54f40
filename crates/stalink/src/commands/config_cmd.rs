//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use stalink_core::{OctetString, PmfPolicy, StaConfigView, from_binary, to_binary};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

// ── Output shapes ───────────────────────────────────────────────────

#[derive(Serialize)]
struct ShowOutput {
    profile: String,
    persist: bool,
    #[serde(flatten)]
    station: StaConfigView,
}

#[derive(Serialize)]
struct ProfileEntry {
    name: String,
    ssid: Option<OctetString>,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

fn show_rows(out: &ShowOutput) -> Vec<(&'static str, String)> {
    let st = &out.station;
    let pmf = if st.pmf == PmfPolicy::REQUIRED {
        "required"
    } else {
        "available"
    };
    vec![
        ("profile", out.profile.clone()),
        ("persist", out.persist.to_string()),
        ("ssid", st.ssid.to_string()),
        ("pwd", st.pwd.to_string()),
        (
            "bssid",
            st.bssid.map_or_else(|| "-".into(), |mac| mac.to_string()),
        ),
        ("pmf", format!("{} ({pmf})", st.pmf)),
        (
            "scan_method",
            st.scan_method.map_or("-", <&'static str>::from).into(),
        ),
        ("channel", st.channel.to_string()),
        ("listen_interval", st.listen_interval.to_string()),
        ("sort_by", st.sort_by.map_or("-", <&'static str>::from).into()),
        ("threshold_rssi", st.threshold_rssi.to_string()),
        ("threshold_authmode", st.threshold_authmode.to_string()),
        ("rm", st.rm.to_string()),
        ("btm", st.btm.to_string()),
        ("mbo", st.mbo.to_string()),
        ("sae_pwe", st.sae_pwe.to_string()),
    ]
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config(global)?;
            let format = config::output_format(global, &cfg);
            let (name, profile) = config::active_profile(global, &cfg)?;

            let station = stalink_config::resolve_station(&profile)?;
            let mut view = from_binary(&to_binary(&station)?);
            if !view.pwd.is_empty() {
                view.pwd = MASK.into();
            }
            let out = ShowOutput {
                profile: name,
                persist: stalink_config::persist(&cfg, &profile),
                station: view,
            };
            let rendered = output::render_single(format, &out, show_rows)?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config(global)?;
            let format = config::output_format(global, &cfg);
            let default = cfg.default_profile.as_deref().unwrap_or("default");

            let mut entries: Vec<ProfileEntry> = cfg
                .profiles
                .iter()
                .map(|(name, profile)| ProfileEntry {
                    name: name.clone(),
                    ssid: profile.station.ssid.clone(),
                    default: name == default,
                })
                .collect();
            entries.sort_by(|a, b| a.name.cmp(&b.name));

            let rendered = output::render_list(format, &entries, |e| ProfileRow {
                name: e.name.clone(),
                ssid: e.ssid.as_ref().map(ToString::to_string).unwrap_or_default(),
                default: if e.default { "*" } else { "" },
            })?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
    }
}
