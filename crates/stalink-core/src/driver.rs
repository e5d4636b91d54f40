// ── Collaborator seams ──
//
// The radio driver and the network interface are external. This module
// fixes the shapes this crate exchanges with them: the driver's binary
// station record, its raw event payloads, and the primitive calls.

use std::net::Ipv4Addr;

use crate::error::DriverCode;

/// Capacity of the driver's SSID buffer.
pub const SSID_CAPACITY: usize = 32;
/// Capacity of the driver's pre-shared key buffer.
pub const PASSWORD_CAPACITY: usize = 64;

// ── Events ───────────────────────────────────────────────────────────

/// Event source as reported by the underlying event system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventBase {
    Wifi,
    Ip,
}

/// Event ids under [`EventBase::Wifi`].
pub mod wifi_event {
    pub const SCAN_DONE: i32 = 1;
    pub const STA_START: i32 = 2;
    pub const STA_STOP: i32 = 3;
    pub const STA_CONNECTED: i32 = 4;
    pub const STA_DISCONNECTED: i32 = 5;
    pub const STA_AUTHMODE_CHANGE: i32 = 6;
}

/// Event ids under [`EventBase::Ip`].
pub mod ip_event {
    pub const STA_GOT_IP: i32 = 0;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaConnected {
    pub ssid: [u8; SSID_CAPACITY],
    pub ssid_len: u8,
    pub bssid: [u8; 6],
    pub channel: u8,
    pub authmode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaDisconnected {
    pub ssid: [u8; SSID_CAPACITY],
    pub ssid_len: u8,
    pub bssid: [u8; 6],
    pub reason: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthmodeChange {
    pub old_mode: u32,
    pub new_mode: u32,
}

/// Addresses are 32-bit values holding the octets in network order, i.e.
/// the in-memory bytes read `a.b.c.d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GotIp {
    pub ip: u32,
    pub netmask: u32,
    pub gw: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDone {
    pub status: u32,
    pub number: u8,
}

/// Raw payload attached to a driver event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    None,
    StaConnected(StaConnected),
    StaDisconnected(StaDisconnected),
    AuthmodeChange(AuthmodeChange),
    GotIp(GotIp),
    ScanDone(ScanDone),
}

/// One notification from the underlying event system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverEvent {
    pub base: EventBase,
    pub id: i32,
    pub payload: EventPayload,
}

impl DriverEvent {
    pub fn new(base: EventBase, id: i32, payload: EventPayload) -> Self {
        Self { base, id, payload }
    }
}

/// Copy `text` into a fixed SSID buffer, returning the buffer and length.
pub fn ssid_buffer(text: &[u8]) -> ([u8; SSID_CAPACITY], u8) {
    let mut buf = [0u8; SSID_CAPACITY];
    let len = text.len().min(SSID_CAPACITY);
    buf[..len].copy_from_slice(&text[..len]);
    (buf, u8::try_from(len).unwrap_or(u8::MAX))
}

/// Pack dotted-quad octets into the driver's network-order representation.
pub fn ip4_raw(addr: Ipv4Addr) -> u32 {
    u32::from_ne_bytes(addr.octets())
}

/// Inverse of [`ip4_raw`].
pub fn ip4_from_raw(raw: u32) -> Ipv4Addr {
    Ipv4Addr::from(raw.to_ne_bytes())
}

// ── Scan primitives ──────────────────────────────────────────────────

/// Scan request as handed to the driver. `channel == 0` scans all channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanConfig {
    pub ssid: Option<Vec<u8>>,
    pub bssid: Option<[u8; 6]>,
    pub channel: u8,
    pub show_hidden: bool,
}

/// One access point record as stored by the driver after a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApRecord {
    pub bssid: [u8; 6],
    /// NUL-padded.
    pub ssid: [u8; SSID_CAPACITY + 1],
    pub primary: u8,
    /// Secondary channel code: 0 none, 1 above, 2 below.
    pub second: u8,
    pub rssi: i8,
    pub authmode: u32,
}

// ── Station record ───────────────────────────────────────────────────

/// The driver's fixed-layout station configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub ssid: [u8; SSID_CAPACITY],
    pub password: [u8; PASSWORD_CAPACITY],
    pub scan_method: u32,
    pub bssid_set: bool,
    pub bssid: [u8; 6],
    pub channel: u8,
    pub listen_interval: u16,
    pub sort_method: u32,
    pub threshold_rssi: i8,
    pub threshold_authmode: u32,
    pub pmf_required: bool,
    pub rm_enabled: bool,
    pub btm_enabled: bool,
    pub mbo_enabled: bool,
    pub sae_pwe_h2e: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            ssid: [0; SSID_CAPACITY],
            password: [0; PASSWORD_CAPACITY],
            scan_method: 0,
            bssid_set: false,
            bssid: [0; 6],
            channel: 0,
            listen_interval: 0,
            sort_method: 0,
            threshold_rssi: 0,
            threshold_authmode: 0,
            pmf_required: false,
            rm_enabled: false,
            btm_enabled: false,
            mbo_enabled: false,
            sae_pwe_h2e: 0,
        }
    }
}

/// IPv4 settings applied to the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpInfo {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gw: Ipv4Addr,
}

// ── Traits ───────────────────────────────────────────────────────────

/// Radio driver primitives in station mode.
///
/// Every call returns immediately; scan results arrive later through a
/// [`wifi_event::SCAN_DONE`] event.
pub trait WifiDriver {
    fn scan_start(&mut self, config: &ScanConfig) -> Result<(), DriverCode>;

    fn scan_ap_count(&mut self) -> Result<u16, DriverCode>;

    /// Fetch up to `max` records from the last completed scan.
    fn scan_ap_records(&mut self, max: u16) -> Result<Vec<ApRecord>, DriverCode>;

    fn get_config(&mut self) -> Result<StationConfig, DriverCode>;

    /// `persist` selects flash storage over RAM-only storage.
    fn set_config(&mut self, config: &StationConfig, persist: bool) -> Result<(), DriverCode>;

    fn connect(&mut self) -> Result<(), DriverCode>;

    fn disconnect(&mut self) -> Result<(), DriverCode>;

    fn set_power_save(&mut self, mode: u32) -> Result<(), DriverCode>;

    fn power_save(&mut self) -> Result<u32, DriverCode>;

    /// Limit in units of 0.25 dBm.
    fn set_max_tx_power(&mut self, quarter_dbm: i8) -> Result<(), DriverCode>;

    fn mac(&mut self) -> Result<[u8; 6], DriverCode>;
}

/// Network interface (IP stack) primitives for the station interface.
pub trait NetIf {
    fn stop_dhcp_client(&mut self) -> Result<(), DriverCode>;

    fn set_ip_info(&mut self, info: &IpInfo) -> Result<(), DriverCode>;

    /// Set the main DNS server.
    fn set_dns_info(&mut self, server: Ipv4Addr) -> Result<(), DriverCode>;

    fn set_hostname(&mut self, hostname: &str) -> Result<(), DriverCode>;
}
