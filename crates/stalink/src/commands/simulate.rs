//! Simulate subcommand: run a profile against the in-memory radio.
//!
//! Every event is subscribed, the station is configured from the profile,
//! connected, scanned and disconnected. The driver events are then pumped
//! through the event loop and each callback delivery is printed in order.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{Value, json};
use tabled::Tabled;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use stalink_core::driver::ApRecord;
use stalink_core::registry::EVENTS;
use stalink_core::sim::{SimNetif, SimRadio, access_point};
use stalink_core::{
    Callback, DriverCode, FnHost, HostError, Invocation, ScanResult, Station, event_loop,
};

use crate::cli::{GlobalOpts, SimulateArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

const CHANNELS: [u8; 3] = [1, 6, 11];

// ── Delivery log ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Record {
    seq: usize,
    event: &'static str,
    data: Value,
    #[serde(skip)]
    summary: String,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "#")]
    seq: usize,
    #[tabled(rename = "Callback")]
    event: &'static str,
    #[tabled(rename = "Arguments")]
    summary: String,
}

type Log = Arc<Mutex<Vec<Record>>>;

fn push(log: &Log, event: &'static str, data: Value, summary: String) -> Result<(), HostError> {
    let mut records = log
        .lock()
        .map_err(|_| HostError::new("delivery log poisoned"))?;
    let seq = records.len() + 1;
    records.push(Record {
        seq,
        event,
        data,
        summary,
    });
    Ok(())
}

fn scan_summary(results: &[ScanResult]) -> String {
    if results.is_empty() {
        return "no access points".into();
    }
    results
        .iter()
        .map(|r| format!("{} ({}, ch {}, {} dBm)", r.ssid, r.bssid, r.channel, r.rssi))
        .collect::<Vec<_>>()
        .join("; ")
}

fn recorder(log: &Log) -> Callback {
    let log = Arc::clone(log);
    Callback::new(move |call| match call {
        Invocation::Event { kind, info } => {
            let data = serde_json::to_value(info).map_err(|e| HostError::new(e.to_string()))?;
            let summary = serde_json::to_string(info).map_err(|e| HostError::new(e.to_string()))?;
            push(&log, kind.name(), data, summary)
        }
        Invocation::ScanDone(Ok(results)) => {
            let data = serde_json::to_value(results).map_err(|e| HostError::new(e.to_string()))?;
            push(&log, "scan_done", data, scan_summary(results))
        }
        Invocation::ScanDone(Err(failed)) => push(
            &log,
            "scan_done",
            json!({ "error": failed.to_string() }),
            failed.to_string(),
        ),
    })
}

// ── Simulated environment ───────────────────────────────────────────

/// `count` access points. The first one carries the profile's SSID so the
/// connect step has a target.
fn access_points(count: u8, ssid: Option<&[u8]>) -> Vec<ApRecord> {
    (0..count)
        .map(|i| {
            let name = match (i, ssid) {
                (0, Some(ssid)) => ssid.to_vec(),
                _ => format!("sim-ap-{i}").into_bytes(),
            };
            let step = i8::try_from(i).unwrap_or(i8::MAX).saturating_mul(6);
            let mut ap = access_point(
                &name,
                [0x02, 0x5a, 0x00, 0x00, 0x00, i.saturating_add(1)],
                CHANNELS[usize::from(i) % CHANNELS.len()],
                (-38i8).saturating_sub(step),
            );
            ap.second = i % 3;
            ap
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &SimulateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config(global)?;
    let format = config::output_format(global, &cfg);
    let (name, profile) = config::active_profile(global, &cfg)?;
    let station_input = stalink_config::resolve_station(&profile)?;
    let persist = stalink_config::persist(&cfg, &profile);

    let (tx, rx) = mpsc::unbounded_channel();
    let mut radio = SimRadio::new()
        .with_access_points(access_points(args.aps, station_input.ssid.as_deref()))
        .with_event_sink(tx);
    if let Some(code) = args.fail_scan {
        radio.fail_scan_records(DriverCode(code));
    }

    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut station = Station::new(radio, SimNetif::new(), FnHost::new());
    for desc in &EVENTS {
        station.subscribe(desc.kind.name(), Some(recorder(&log)))?;
    }

    info!(profile = %name, aps = args.aps, "starting simulated session");
    station.driver_mut().start();
    station.configure(&station_input, persist)?;
    if let Some(hostname) = &profile.hostname {
        station.set_hostname(hostname)?;
    }
    if let Some(static_ip) = &profile.static_ip {
        station.set_ip(static_ip)?;
    }
    if let Some(mode) = profile.power_save {
        station.set_power_save(mode)?;
    }
    if let Some(dbm) = profile.tx_power {
        station.set_tx_power(dbm)?;
    }
    station.connect()?;
    station.scan(&profile.scan, recorder(&log))?;
    station.disconnect()?;
    station.driver_mut().detach_events();

    let station = event_loop::run(station, rx, CancellationToken::new()).await;
    let failures = station.host().failures().len();
    if failures > 0 {
        warn!(failures, "some callbacks failed");
    }
    drop(station);

    let records = std::mem::take(
        &mut *log
            .lock()
            .map_err(|_| CliError::Render("delivery log poisoned".into()))?,
    );
    let rendered = output::render_list(format, &records, |r| RecordRow {
        seq: r.seq,
        event: r.event,
        summary: r.summary.clone(),
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
