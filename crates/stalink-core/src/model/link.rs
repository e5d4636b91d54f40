// ── Link-level settings outside the station record ──

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::driver::IpInfo;
use crate::error::StationError;

/// Modem power-save level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PowerSave {
    None,
    Min,
    Max,
}

impl PowerSave {
    pub fn code(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Min => 1,
            Self::Max => 2,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Min),
            2 => Some(Self::Max),
            _ => None,
        }
    }
}

/// Static IPv4 assignment. `dns` falls back to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticIp {
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
}

impl StaticIp {
    /// Parse every address, returning the interface settings and DNS server.
    pub fn resolve(&self) -> Result<(IpInfo, Ipv4Addr), StationError> {
        let ip = parse_addr("ip", &self.ip)?;
        let netmask = parse_addr("netmask", &self.netmask)?;
        let gw = parse_addr("gateway", &self.gateway)?;
        let dns = match &self.dns {
            Some(raw) => parse_addr("dns", raw)?,
            None => gw,
        };
        Ok((IpInfo { ip, netmask, gw }, dns))
    }
}

fn parse_addr(field: &'static str, raw: &str) -> Result<Ipv4Addr, StationError> {
    raw.trim()
        .parse()
        .map_err(|_| StationError::invalid(field, format!("could not parse address '{raw}'")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn static_ip(dns: Option<&str>) -> StaticIp {
        StaticIp {
            ip: "192.168.1.50".into(),
            netmask: "255.255.255.0".into(),
            gateway: "192.168.1.1".into(),
            dns: dns.map(str::to_owned),
        }
    }

    #[test]
    fn dns_defaults_to_gateway() {
        let (info, dns) = static_ip(None).resolve().unwrap();
        assert_eq!(info.ip, Ipv4Addr::new(192, 168, 1, 50));
        assert_eq!(dns, Ipv4Addr::new(192, 168, 1, 1));
    }

    #[test]
    fn explicit_dns_is_used() {
        let (_, dns) = static_ip(Some("1.1.1.1")).resolve().unwrap();
        assert_eq!(dns, Ipv4Addr::new(1, 1, 1, 1));
    }

    #[test]
    fn bad_address_names_the_field() {
        let mut cfg = static_ip(None);
        cfg.netmask = "255.255.0".into();
        assert_eq!(cfg.resolve().unwrap_err().field(), Some("netmask"));
    }

    #[test]
    fn power_save_symbols() {
        assert_eq!("min".parse::<PowerSave>().unwrap(), PowerSave::Min);
        assert_eq!(PowerSave::from_code(2), Some(PowerSave::Max));
        assert_eq!(PowerSave::from_code(3), None);
        assert_eq!(PowerSave::None.to_string(), "none");
    }
}
