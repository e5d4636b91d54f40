// ── Link lifecycle event types ──

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::mac::MacAddress;
use super::octets::OctetString;
use crate::driver::{
    AuthmodeChange, GotIp, SSID_CAPACITY, StaConnected, StaDisconnected, ip4_from_raw,
};

/// Subscribable station events. The string forms are the names hosts
/// subscribe with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Start,
    Stop,
    Connected,
    Disconnected,
    AuthmodeChanged,
    GotIp,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Fields extracted from an event payload, one variant per payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EventInfo {
    Empty {},
    Connected(ConnectedInfo),
    Disconnected(DisconnectedInfo),
    AuthmodeChanged(AuthmodeChangedInfo),
    GotIp(GotIpInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedInfo {
    pub ssid: OctetString,
    pub bssid: MacAddress,
    pub channel: u8,
    pub auth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisconnectedInfo {
    pub ssid: OctetString,
    pub bssid: MacAddress,
    pub reason: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthmodeChangedInfo {
    pub old_mode: u32,
    pub new_mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GotIpInfo {
    pub ip: String,
    pub netmask: String,
    pub gw: String,
}

/// The first `len` bytes, as-is. Embedded NULs are kept.
fn ssid_bytes(ssid: &[u8; SSID_CAPACITY], len: u8) -> OctetString {
    let len = usize::from(len).min(SSID_CAPACITY);
    OctetString::from(&ssid[..len])
}

impl From<&StaConnected> for ConnectedInfo {
    fn from(raw: &StaConnected) -> Self {
        Self {
            ssid: ssid_bytes(&raw.ssid, raw.ssid_len),
            bssid: MacAddress::new(raw.bssid),
            channel: raw.channel,
            auth: raw.authmode,
        }
    }
}

impl From<&StaDisconnected> for DisconnectedInfo {
    fn from(raw: &StaDisconnected) -> Self {
        Self {
            ssid: ssid_bytes(&raw.ssid, raw.ssid_len),
            bssid: MacAddress::new(raw.bssid),
            reason: raw.reason,
        }
    }
}

impl From<&AuthmodeChange> for AuthmodeChangedInfo {
    fn from(raw: &AuthmodeChange) -> Self {
        Self {
            old_mode: raw.old_mode,
            new_mode: raw.new_mode,
        }
    }
}

impl From<&GotIp> for GotIpInfo {
    fn from(raw: &GotIp) -> Self {
        Self {
            ip: ip4_from_raw(raw.ip).to_string(),
            netmask: ip4_from_raw(raw.netmask).to_string(),
            gw: ip4_from_raw(raw.gw).to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::driver::{ip4_raw, ssid_buffer};

    #[test]
    fn names_are_snake_case() {
        let names: Vec<&str> = EventKind::iter().map(EventKind::name).collect();
        assert_eq!(
            names,
            [
                "start",
                "stop",
                "connected",
                "disconnected",
                "authmode_changed",
                "got_ip"
            ]
        );
        assert_eq!("got_ip".parse::<EventKind>().unwrap(), EventKind::GotIp);
        assert!("scan_done".parse::<EventKind>().is_err());
    }

    #[test]
    fn got_ip_renders_shortest_dotted_quad() {
        let info = GotIpInfo::from(&GotIp {
            ip: ip4_raw(Ipv4Addr::new(10, 0, 0, 7)),
            netmask: ip4_raw(Ipv4Addr::new(255, 255, 255, 0)),
            gw: ip4_raw(Ipv4Addr::new(10, 0, 0, 1)),
        });
        assert_eq!(info.ip, "10.0.0.7");
        assert_eq!(info.netmask, "255.255.255.0");
        assert_eq!(info.gw, "10.0.0.1");
    }

    #[test]
    fn ssid_uses_reported_length_only() {
        let (ssid, _) = ssid_buffer(b"cafe\0wifi");
        let info = ConnectedInfo::from(&StaConnected {
            ssid,
            ssid_len: 9,
            bssid: [1, 2, 3, 4, 5, 6],
            channel: 6,
            authmode: 3,
        });
        assert_eq!(info.ssid, "cafe\0wifi");
        assert_eq!(info.bssid.to_string(), "01:02:03:04:05:06");
    }

    #[test]
    fn ssid_bytes_are_not_decoded() {
        let (ssid, ssid_len) = ssid_buffer(b"caf\xe9");
        let info = ConnectedInfo::from(&StaConnected {
            ssid,
            ssid_len,
            bssid: [1, 2, 3, 4, 5, 6],
            channel: 1,
            authmode: 0,
        });
        assert_eq!(info.ssid.as_bytes(), b"caf\xe9");

        let info = DisconnectedInfo::from(&StaDisconnected {
            ssid,
            ssid_len,
            bssid: [0; 6],
            reason: 8,
        });
        assert_eq!(info.ssid.as_bytes(), b"caf\xe9");
    }

    #[test]
    fn oversized_length_is_clamped() {
        let (ssid, _) = ssid_buffer(b"net");
        let info = DisconnectedInfo::from(&StaDisconnected {
            ssid,
            ssid_len: 200,
            bssid: [0; 6],
            reason: 201,
        });
        assert_eq!(info.ssid.len(), SSID_CAPACITY);
        assert_eq!(info.reason, 201);
    }

    #[test]
    fn empty_info_serializes_as_empty_object() {
        assert_eq!(serde_json::to_string(&EventInfo::Empty {}).unwrap(), "{}");
    }
}
