// ── Hardware addresses ──
//
// Peer addresses arrive as text in one of four grammars and leave as
// lowercase colon-separated text. Internally they are always six octets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Separators tried in order. `None` is the bare twelve-digit form.
const SEPARATORS: [Option<char>; 4] = [None, Some(':'), Some('-'), Some(' ')];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a hardware address: {0:?}")]
pub struct InvalidMac(pub String);

/// Six-octet hardware address (BSSID / station MAC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Parse any accepted textual form. The first grammar that matches wins.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        SEPARATORS
            .iter()
            .find_map(|sep| parse_with(raw, *sep))
            .map(Self)
    }
}

fn parse_with(raw: &str, separator: Option<char>) -> Option<[u8; 6]> {
    let mut octets = [0u8; 6];
    match separator {
        None => {
            if raw.len() != 12 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            for (slot, pair) in octets.iter_mut().zip(raw.as_bytes().chunks(2)) {
                *slot = hex_octet(std::str::from_utf8(pair).ok()?)?;
            }
        }
        Some(sep) => {
            let mut parts = raw.split(sep);
            for slot in &mut octets {
                *slot = hex_octet(parts.next()?)?;
            }
            if parts.next().is_some() {
                return None;
            }
        }
    }
    Some(octets)
}

/// One or two hex digits. `from_str_radix` alone would also take a sign.
fn hex_octet(part: &str) -> Option<u8> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(part, 16).ok()
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = InvalidMac;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidMac(s.to_owned()))
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const OCTETS: [u8; 6] = [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0xef];

    #[test]
    fn accepts_all_four_grammars() {
        for raw in [
            "001a2b3c4def",
            "00:1a:2b:3c:4d:ef",
            "00-1A-2B-3C-4D-EF",
            "00 1a 2b 3c 4d ef",
        ] {
            assert_eq!(MacAddress::parse(raw), Some(MacAddress(OCTETS)), "{raw}");
        }
    }

    #[test]
    fn single_digit_groups_are_accepted_with_separators() {
        let mac: MacAddress = "0:1a:2b:3c:4d:ef".parse().unwrap();
        assert_eq!(mac.octets(), OCTETS);
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in [
            "",
            "001a2b3c4d",
            "001a2b3c4def00",
            "00:1a:2b:3c:4d",
            "00:1a:2b:3c:4d:ef:01",
            "00:1a-2b:3c:4d:ef",
            "zz:1a:2b:3c:4d:ef",
            "+0:1a:2b:3c:4d:ef",
            "000:1a:2b:3c:4d:ef",
        ] {
            assert!(MacAddress::parse(raw).is_none(), "{raw}");
        }
    }

    #[test]
    fn display_is_lowercase_colon_separated() {
        assert_eq!(MacAddress(OCTETS).to_string(), "00:1a:2b:3c:4d:ef");
    }

    #[test]
    fn serde_uses_text_form() {
        let json = serde_json::to_string(&MacAddress(OCTETS)).unwrap();
        assert_eq!(json, "\"00:1a:2b:3c:4d:ef\"");
        let back: MacAddress = serde_json::from_str("\"00-1a-2b-3c-4d-ef\"").unwrap();
        assert_eq!(back, MacAddress(OCTETS));
    }
}
