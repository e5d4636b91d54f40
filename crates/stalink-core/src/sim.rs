// ── Simulated radio ──
//
// In-memory stand-ins for the radio driver and the network interface.
// They keep just enough state to answer read-back calls, record what was
// asked of them, and can post the events a real driver would emit.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use tokio::sync::mpsc;
use tracing::trace;

use crate::driver::{
    ApRecord, DriverEvent, EventBase, EventPayload, GotIp, IpInfo, NetIf, SSID_CAPACITY,
    ScanConfig, ScanDone, StaConnected, StaDisconnected, StationConfig, WifiDriver, ip_event,
    ip4_raw, ssid_buffer, wifi_event,
};
use crate::error::DriverCode;

/// WPA2-PSK in the driver's auth mode numbering.
pub const AUTH_WPA2_PSK: u32 = 3;
/// Disconnect reason for a station that left on request.
pub const REASON_ASSOC_LEAVE: u16 = 8;

/// Build an access point record for [`SimRadio::with_access_points`].
pub fn access_point(ssid: impl AsRef<[u8]>, bssid: [u8; 6], channel: u8, rssi: i8) -> ApRecord {
    let ssid = ssid.as_ref();
    let mut buf = [0u8; SSID_CAPACITY + 1];
    let len = ssid.len().min(SSID_CAPACITY);
    buf[..len].copy_from_slice(&ssid[..len]);
    ApRecord {
        bssid,
        ssid: buf,
        primary: channel,
        second: 0,
        rssi,
        authmode: AUTH_WPA2_PSK,
    }
}

/// Primitives whose failure can be scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ScanStart,
    ScanCount,
    ScanRecords,
    GetConfig,
    SetConfig,
    Connect,
    Disconnect,
    PowerSave,
    TxPower,
    Mac,
    StopDhcp,
    SetIpInfo,
    SetDns,
    SetHostname,
}

#[derive(Debug, Default)]
struct Failures(HashMap<Op, DriverCode>);

impl Failures {
    fn check(&self, op: Op) -> Result<(), DriverCode> {
        match self.0.get(&op) {
            Some(code) => {
                trace!(?op, %code, "scripted failure");
                Err(*code)
            }
            None => Ok(()),
        }
    }
}

// ── Radio ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SimRadio {
    config: StationConfig,
    persisted: Option<bool>,
    access_points: Vec<ApRecord>,
    count_override: Option<u16>,
    power_save: u32,
    tx_power: Option<i8>,
    mac: [u8; 6],
    scans_started: usize,
    last_scan: Option<ScanConfig>,
    failures: Failures,
    events: Option<mpsc::UnboundedSender<DriverEvent>>,
}

impl Default for SimRadio {
    fn default() -> Self {
        Self {
            config: StationConfig::default(),
            persisted: None,
            access_points: Vec::new(),
            count_override: None,
            power_save: 1,
            tx_power: None,
            mac: [0x24, 0x0a, 0xc4, 0x00, 0x00, 0x01],
            scans_started: 0,
            last_scan: None,
            failures: Failures::default(),
            events: None,
        }
    }
}

impl SimRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_points(mut self, access_points: Vec<ApRecord>) -> Self {
        self.access_points = access_points;
        self
    }

    /// Post driver events into `sink` as a real event loop would.
    pub fn with_event_sink(mut self, sink: mpsc::UnboundedSender<DriverEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Stop posting events. Dropping the last sender closes the channel.
    pub fn detach_events(&mut self) {
        self.events = None;
    }

    pub fn fail(&mut self, op: Op, code: DriverCode) {
        self.failures.0.insert(op, code);
    }

    pub fn fail_scan_start(&mut self, code: DriverCode) {
        self.fail(Op::ScanStart, code);
    }

    pub fn fail_scan_records(&mut self, code: DriverCode) {
        self.fail(Op::ScanRecords, code);
    }

    /// Make `scan_ap_count` report `count` regardless of the stored records.
    pub fn report_count(&mut self, count: u16) {
        self.count_override = Some(count);
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Storage mode of the last accepted `set_config`.
    pub fn persisted(&self) -> Option<bool> {
        self.persisted
    }

    pub fn scans_started(&self) -> usize {
        self.scans_started
    }

    pub fn last_scan(&self) -> Option<&ScanConfig> {
        self.last_scan.as_ref()
    }

    pub fn tx_power(&self) -> Option<i8> {
        self.tx_power
    }

    /// Emit the station-start event.
    pub fn start(&mut self) {
        self.post(EventBase::Wifi, wifi_event::STA_START, EventPayload::None);
    }

    pub fn post(&mut self, base: EventBase, id: i32, payload: EventPayload) {
        if let Some(sink) = &self.events {
            if sink.send(DriverEvent::new(base, id, payload)).is_err() {
                trace!("event sink closed");
            }
        }
    }

    fn ssid_len(&self) -> usize {
        self.config
            .ssid
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(SSID_CAPACITY)
    }

    /// Records matching the last scan request.
    fn visible(&self) -> impl Iterator<Item = &ApRecord> {
        let filter = self.last_scan.clone().unwrap_or_default();
        self.access_points.iter().filter(move |ap| {
            let ssid_len = ap.ssid.iter().position(|b| *b == 0).unwrap_or(SSID_CAPACITY);
            let ssid = &ap.ssid[..ssid_len];
            (filter.show_hidden || !ssid.is_empty())
                && filter.ssid.as_deref().is_none_or(|want| want == ssid)
                && filter.bssid.is_none_or(|want| want == ap.bssid)
                && (filter.channel == 0 || filter.channel == ap.primary)
        })
    }

    /// The access point `connect` would pick: configured BSSID, else the
    /// strongest record with a matching SSID.
    fn target(&self) -> Option<&ApRecord> {
        let ssid = &self.config.ssid[..self.ssid_len()];
        self.access_points
            .iter()
            .filter(|ap| {
                if self.config.bssid_set {
                    ap.bssid == self.config.bssid
                } else {
                    ap.ssid.starts_with(ssid) && ap.ssid.get(ssid.len()) == Some(&0)
                }
            })
            .max_by_key(|ap| ap.rssi)
    }
}

impl WifiDriver for SimRadio {
    fn scan_start(&mut self, config: &ScanConfig) -> Result<(), DriverCode> {
        self.failures.check(Op::ScanStart)?;
        self.scans_started += 1;
        self.last_scan = Some(config.clone());
        let number = u8::try_from(self.visible().count()).unwrap_or(u8::MAX);
        self.post(
            EventBase::Wifi,
            wifi_event::SCAN_DONE,
            EventPayload::ScanDone(ScanDone { status: 0, number }),
        );
        Ok(())
    }

    fn scan_ap_count(&mut self) -> Result<u16, DriverCode> {
        self.failures.check(Op::ScanCount)?;
        Ok(self
            .count_override
            .unwrap_or_else(|| u16::try_from(self.visible().count()).unwrap_or(u16::MAX)))
    }

    fn scan_ap_records(&mut self, max: u16) -> Result<Vec<ApRecord>, DriverCode> {
        self.failures.check(Op::ScanRecords)?;
        Ok(self
            .visible()
            .take(usize::from(max))
            .cloned()
            .collect())
    }

    fn get_config(&mut self) -> Result<StationConfig, DriverCode> {
        self.failures.check(Op::GetConfig)?;
        Ok(self.config.clone())
    }

    fn set_config(&mut self, config: &StationConfig, persist: bool) -> Result<(), DriverCode> {
        self.failures.check(Op::SetConfig)?;
        self.config = config.clone();
        self.persisted = Some(persist);
        Ok(())
    }

    fn connect(&mut self) -> Result<(), DriverCode> {
        self.failures.check(Op::Connect)?;
        let (ssid, ssid_len) = ssid_buffer(&self.config.ssid[..self.ssid_len()]);
        let (bssid, channel) = match self.target() {
            Some(ap) => (ap.bssid, ap.primary),
            None => (self.config.bssid, self.config.channel.max(1)),
        };
        self.post(
            EventBase::Wifi,
            wifi_event::STA_CONNECTED,
            EventPayload::StaConnected(StaConnected {
                ssid,
                ssid_len,
                bssid,
                channel,
                authmode: AUTH_WPA2_PSK,
            }),
        );
        self.post(
            EventBase::Ip,
            ip_event::STA_GOT_IP,
            EventPayload::GotIp(GotIp {
                ip: ip4_raw(Ipv4Addr::new(192, 168, 4, 2)),
                netmask: ip4_raw(Ipv4Addr::new(255, 255, 255, 0)),
                gw: ip4_raw(Ipv4Addr::new(192, 168, 4, 1)),
            }),
        );
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DriverCode> {
        self.failures.check(Op::Disconnect)?;
        let (ssid, ssid_len) = ssid_buffer(&self.config.ssid[..self.ssid_len()]);
        let bssid = self.target().map_or(self.config.bssid, |ap| ap.bssid);
        self.post(
            EventBase::Wifi,
            wifi_event::STA_DISCONNECTED,
            EventPayload::StaDisconnected(StaDisconnected {
                ssid,
                ssid_len,
                bssid,
                reason: REASON_ASSOC_LEAVE,
            }),
        );
        Ok(())
    }

    fn set_power_save(&mut self, mode: u32) -> Result<(), DriverCode> {
        self.failures.check(Op::PowerSave)?;
        self.power_save = mode;
        Ok(())
    }

    fn power_save(&mut self) -> Result<u32, DriverCode> {
        self.failures.check(Op::PowerSave)?;
        Ok(self.power_save)
    }

    fn set_max_tx_power(&mut self, quarter_dbm: i8) -> Result<(), DriverCode> {
        self.failures.check(Op::TxPower)?;
        self.tx_power = Some(quarter_dbm);
        Ok(())
    }

    fn mac(&mut self) -> Result<[u8; 6], DriverCode> {
        self.failures.check(Op::Mac)?;
        Ok(self.mac)
    }
}

// ── Network interface ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimNetif {
    dhcp_running: bool,
    ip_info: Option<IpInfo>,
    dns: Option<Ipv4Addr>,
    hostname: Option<String>,
    failures: Failures,
}

impl SimNetif {
    pub fn new() -> Self {
        Self {
            dhcp_running: true,
            ..Self::default()
        }
    }

    pub fn fail(&mut self, op: Op, code: DriverCode) {
        self.failures.0.insert(op, code);
    }

    pub fn dhcp_running(&self) -> bool {
        self.dhcp_running
    }

    pub fn ip_info(&self) -> Option<&IpInfo> {
        self.ip_info.as_ref()
    }

    pub fn dns(&self) -> Option<Ipv4Addr> {
        self.dns
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
}

impl NetIf for SimNetif {
    fn stop_dhcp_client(&mut self) -> Result<(), DriverCode> {
        self.failures.check(Op::StopDhcp)?;
        self.dhcp_running = false;
        Ok(())
    }

    fn set_ip_info(&mut self, info: &IpInfo) -> Result<(), DriverCode> {
        self.failures.check(Op::SetIpInfo)?;
        self.ip_info = Some(*info);
        Ok(())
    }

    fn set_dns_info(&mut self, server: Ipv4Addr) -> Result<(), DriverCode> {
        self.failures.check(Op::SetDns)?;
        self.dns = Some(server);
        Ok(())
    }

    fn set_hostname(&mut self, hostname: &str) -> Result<(), DriverCode> {
        self.failures.check(Op::SetHostname)?;
        self.hostname = Some(hostname.to_owned());
        Ok(())
    }
}
