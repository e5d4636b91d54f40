// ── Scan request and result types ──

use serde::{Deserialize, Serialize};

use super::mac::MacAddress;
use super::octets::OctetString;
use crate::driver::{ApRecord, ScanConfig};
use crate::error::StationError;

/// Optional restrictions for a scan. An empty filter scans everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    pub hidden: bool,
}

impl ScanFilter {
    pub fn to_driver_config(&self) -> Result<ScanConfig, StationError> {
        let bssid = self
            .bssid
            .as_deref()
            .map(|raw| {
                MacAddress::parse(raw).ok_or_else(|| {
                    StationError::invalid("bssid", format!("not a hardware address: {raw}"))
                })
            })
            .transpose()?;
        Ok(ScanConfig {
            ssid: self.ssid.as_ref().map(|s| s.as_bytes().to_vec()),
            bssid: bssid.map(|mac| mac.octets()),
            channel: self.channel.unwrap_or(0),
            show_hidden: self.hidden,
        })
    }
}

/// Channel width, derived from the secondary channel code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bandwidth {
    #[serde(rename = "HT20")]
    Ht20,
    #[serde(rename = "HT40+")]
    Ht40Above,
    #[serde(rename = "HT40-")]
    Ht40Below,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Bandwidth {
    pub fn from_second_channel(code: u8) -> Self {
        match code {
            0 => Self::Ht20,
            1 => Self::Ht40Above,
            2 => Self::Ht40Below,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ht20 => "HT20",
            Self::Ht40Above => "HT40+",
            Self::Ht40Below => "HT40-",
            Self::Unknown => "unknown",
        }
    }
}

/// One access point found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub bssid: MacAddress,
    pub ssid: OctetString,
    pub channel: u8,
    pub rssi: i8,
    pub auth: u32,
    pub bandwidth: Bandwidth,
}

impl From<&ApRecord> for ScanResult {
    fn from(ap: &ApRecord) -> Self {
        Self {
            bssid: MacAddress::new(ap.bssid),
            ssid: OctetString::until_nul(&ap.ssid),
            channel: ap.primary,
            rssi: ap.rssi,
            auth: ap.authmode,
            bandwidth: Bandwidth::from_second_channel(ap.second),
        }
    }
}
