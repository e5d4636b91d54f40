// ── Station configuration marshalling ──
//
// `StaConfigInput` is the sparse record a host hands in; `StationConfig`
// is the driver's fixed-layout record; `StaConfigView` is the read-back
// projection. Validation happens on a scratch copy so a rejected input
// never leaves a half-written record behind.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use super::mac::MacAddress;
use super::octets::OctetString;
use crate::driver::StationConfig;
use crate::error::StationError;

// ── Enumerated fields ────────────────────────────────────────────────

/// Protected management frame policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PmfPolicy {
    Available,
    Required,
}

impl PmfPolicy {
    pub const AVAILABLE: u8 = 1;
    pub const REQUIRED: u8 = 2;

    pub fn code(self) -> u8 {
        match self {
            Self::Available => Self::AVAILABLE,
            Self::Required => Self::REQUIRED,
        }
    }

    /// Only [`Self::REQUIRED`] demands protection; any other code leaves it
    /// available.
    pub fn from_code(code: u8) -> Self {
        if code == Self::REQUIRED {
            Self::Required
        } else {
            Self::Available
        }
    }
}

/// How the driver scans for the configured network before connecting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanMethod {
    Fast,
    All,
}

impl ScanMethod {
    pub fn code(self) -> u32 {
        match self {
            Self::Fast => 0,
            Self::All => 1,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Fast),
            1 => Some(Self::All),
            _ => None,
        }
    }
}

/// Ordering used when several access points match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortMethod {
    Rssi,
    Authmode,
}

impl SortMethod {
    pub fn code(self) -> u32 {
        match self {
            Self::Rssi => 0,
            Self::Authmode => 1,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Rssi),
            1 => Some(Self::Authmode),
            _ => None,
        }
    }
}

// ── Sparse input ─────────────────────────────────────────────────────

/// Partially specified station configuration.
///
/// Absent fields leave the base record untouched when merged; against the
/// zeroed default record that means "off" for every toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaConfigInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<OctetString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwd: Option<OctetString>,
    /// Any of `aabbccddeeff`, `aa:bb:..`, `aa-bb-..` or `aa bb ..`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bssid: Option<String>,
    /// [`PmfPolicy::REQUIRED`] demands protection; anything else means
    /// [`PmfPolicy::AVAILABLE`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmf: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    /// `"fast"` or `"all"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_interval: Option<u16>,
    /// `"rssi"` or `"authmode"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_rssi: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_authmode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mbo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sae_pwe: Option<u32>,
}

impl StaConfigInput {
    /// Merge onto `base`, validating every present field first.
    pub fn apply_to(&self, base: &StationConfig) -> Result<StationConfig, StationError> {
        let bssid = self.bssid.as_deref().map(parse_bssid).transpose()?;
        let scan_method = self
            .scan_method
            .as_deref()
            .map(|raw| parse_symbol::<ScanMethod>("scan_method", raw, "'fast' or 'all'"))
            .transpose()?;
        let sort_method = self
            .sort_by
            .as_deref()
            .map(|raw| parse_symbol::<SortMethod>("sort_by", raw, "'rssi' or 'authmode'"))
            .transpose()?;

        let mut cfg = base.clone();
        if let Some(ssid) = &self.ssid {
            copy_truncated(&mut cfg.ssid, ssid);
        }
        if let Some(pwd) = &self.pwd {
            copy_truncated(&mut cfg.password, pwd);
        }
        if let Some(bssid) = bssid {
            cfg.bssid = bssid.octets();
            cfg.bssid_set = true;
        }
        if let Some(code) = self.pmf {
            cfg.pmf_required = PmfPolicy::from_code(code) == PmfPolicy::Required;
        }
        if let Some(method) = scan_method {
            cfg.scan_method = method.code();
        }
        if let Some(method) = sort_method {
            cfg.sort_method = method.code();
        }
        if let Some(channel) = self.channel {
            cfg.channel = channel;
        }
        if let Some(interval) = self.listen_interval {
            cfg.listen_interval = interval;
        }
        if let Some(rssi) = self.threshold_rssi {
            cfg.threshold_rssi = rssi;
        }
        if let Some(authmode) = self.threshold_authmode {
            cfg.threshold_authmode = authmode;
        }
        if let Some(rm) = self.rm {
            cfg.rm_enabled = rm;
        }
        if let Some(btm) = self.btm {
            cfg.btm_enabled = btm;
        }
        if let Some(mbo) = self.mbo {
            cfg.mbo_enabled = mbo;
        }
        if let Some(pwe) = self.sae_pwe {
            cfg.sae_pwe_h2e = pwe;
        }
        Ok(cfg)
    }
}

fn parse_bssid(raw: &str) -> Result<MacAddress, StationError> {
    MacAddress::parse(raw)
        .ok_or_else(|| StationError::invalid("bssid", format!("not a hardware address: {raw}")))
}

fn parse_symbol<T: FromStr>(
    field: &'static str,
    raw: &str,
    expected: &str,
) -> Result<T, StationError> {
    raw.parse()
        .map_err(|_| StationError::invalid(field, format!("expected {expected}, got '{raw}'")))
}

/// Zero `buf`, then copy as much of `src` as fits.
fn copy_truncated(buf: &mut [u8], src: &[u8]) {
    buf.fill(0);
    let len = src.len().min(buf.len());
    buf[..len].copy_from_slice(&src[..len]);
}

// ── Read-back projection ─────────────────────────────────────────────

/// The driver record projected back into host terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaConfigView {
    pub ssid: OctetString,
    pub pwd: OctetString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bssid: Option<MacAddress>,
    pub pmf: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_method: Option<ScanMethod>,
    pub channel: u8,
    pub listen_interval: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortMethod>,
    pub threshold_rssi: i8,
    pub threshold_authmode: u32,
    pub rm: bool,
    pub btm: bool,
    pub mbo: bool,
    pub sae_pwe: u32,
}

// ── Marshaller entry points ──────────────────────────────────────────

/// Build a fresh driver record from a sparse input.
pub fn to_binary(input: &StaConfigInput) -> Result<StationConfig, StationError> {
    input.apply_to(&StationConfig::default())
}

/// Project a driver record back into a sparse record. Never fails: codes
/// outside the known symbol sets are left out.
pub fn from_binary(cfg: &StationConfig) -> StaConfigView {
    let pmf = if cfg.pmf_required {
        PmfPolicy::Required
    } else {
        PmfPolicy::Available
    };
    StaConfigView {
        ssid: OctetString::until_nul(&cfg.ssid),
        pwd: OctetString::until_nul(&cfg.password),
        bssid: cfg.bssid_set.then(|| MacAddress::new(cfg.bssid)),
        pmf: pmf.code(),
        scan_method: ScanMethod::from_code(cfg.scan_method),
        channel: cfg.channel,
        listen_interval: cfg.listen_interval,
        sort_by: SortMethod::from_code(cfg.sort_method),
        threshold_rssi: cfg.threshold_rssi,
        threshold_authmode: cfg.threshold_authmode,
        rm: cfg.rm_enabled,
        btm: cfg.btm_enabled,
        mbo: cfg.mbo_enabled,
        sae_pwe: cfg.sae_pwe_h2e,
    }
}

impl From<StaConfigView> for StaConfigInput {
    fn from(view: StaConfigView) -> Self {
        Self {
            ssid: Some(view.ssid),
            pwd: Some(view.pwd),
            bssid: view.bssid.map(|mac| mac.to_string()),
            pmf: Some(view.pmf),
            channel: Some(view.channel),
            scan_method: view
                .scan_method
                .map(|m| <&'static str>::from(m).to_owned()),
            listen_interval: Some(view.listen_interval),
            sort_by: view.sort_by.map(|m| <&'static str>::from(m).to_owned()),
            threshold_rssi: Some(view.threshold_rssi),
            threshold_authmode: Some(view.threshold_authmode),
            rm: Some(view.rm),
            btm: Some(view.btm),
            mbo: Some(view.mbo),
            sae_pwe: Some(view.sae_pwe),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::driver::{PASSWORD_CAPACITY, SSID_CAPACITY};

    fn input() -> StaConfigInput {
        StaConfigInput {
            ssid: Some("home".into()),
            pwd: Some("hunter22".into()),
            ..Default::default()
        }
    }

    #[test]
    fn every_bssid_grammar_reads_back_canonical() {
        for raw in [
            "a0b1c2d3e4f5",
            "a0:b1:c2:d3:e4:f5",
            "A0-B1-C2-D3-E4-F5",
            "a0 b1 c2 d3 e4 f5",
        ] {
            let cfg = to_binary(&StaConfigInput {
                bssid: Some(raw.into()),
                ..input()
            })
            .unwrap();
            assert!(cfg.bssid_set);
            let view = from_binary(&cfg);
            assert_eq!(
                view.bssid.map(|m| m.to_string()).as_deref(),
                Some("a0:b1:c2:d3:e4:f5"),
                "{raw}"
            );
        }
    }

    #[test]
    fn invalid_bssid_is_rejected() {
        let err = to_binary(&StaConfigInput {
            bssid: Some("a0:b1:c2".into()),
            ..input()
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("bssid"));
    }

    #[test]
    fn long_ssid_and_password_are_truncated() {
        let ssid = "s".repeat(40);
        let pwd = "p".repeat(70);
        let cfg = to_binary(&StaConfigInput {
            ssid: Some(ssid.as_str().into()),
            pwd: Some(pwd.as_str().into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(&cfg.ssid[..], &ssid.as_bytes()[..SSID_CAPACITY]);
        assert_eq!(&cfg.password[..], &pwd.as_bytes()[..PASSWORD_CAPACITY]);

        let view = from_binary(&cfg);
        assert_eq!(view.ssid.len(), SSID_CAPACITY);
        assert_eq!(view.pwd.len(), PASSWORD_CAPACITY);
    }

    #[test]
    fn non_utf8_ssid_and_password_read_back_unchanged() {
        let cfg = to_binary(&StaConfigInput {
            ssid: Some(OctetString::new(b"caf\xe9".to_vec())),
            pwd: Some(OctetString::new(b"\xff\xfekey".to_vec())),
            ..Default::default()
        })
        .unwrap();
        let view = from_binary(&cfg);
        assert_eq!(view.ssid.as_bytes(), b"caf\xe9");
        assert_eq!(view.pwd.as_bytes(), b"\xff\xfekey");

        let again = to_binary(&StaConfigInput::from(view)).unwrap();
        assert_eq!(again, cfg);
    }

    #[test]
    fn unknown_scan_method_is_rejected() {
        let err = to_binary(&StaConfigInput {
            scan_method: Some("slow".into()),
            ..input()
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("scan_method"));
    }

    #[test]
    fn unknown_sort_order_is_rejected() {
        let err = to_binary(&StaConfigInput {
            sort_by: Some("channel".into()),
            ..input()
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("sort_by"));
    }

    #[test]
    fn enumerated_fields_map_to_codes() {
        let cfg = to_binary(&StaConfigInput {
            scan_method: Some("all".into()),
            sort_by: Some("authmode".into()),
            ..input()
        })
        .unwrap();
        assert_eq!(cfg.scan_method, 1);
        assert_eq!(cfg.sort_method, 1);
    }

    #[test]
    fn pmf_codes() {
        let required = to_binary(&StaConfigInput {
            pmf: Some(PmfPolicy::REQUIRED),
            ..input()
        })
        .unwrap();
        assert!(required.pmf_required);

        let available = to_binary(&StaConfigInput {
            pmf: Some(PmfPolicy::AVAILABLE),
            ..input()
        })
        .unwrap();
        assert!(!available.pmf_required);
        assert!(!to_binary(&input()).unwrap().pmf_required);

        for code in [0, 3, 7, u8::MAX] {
            let cfg = to_binary(&StaConfigInput {
                pmf: Some(code),
                ..input()
            })
            .unwrap();
            assert!(!cfg.pmf_required, "{code}");
            assert_eq!(from_binary(&cfg).pmf, PmfPolicy::AVAILABLE);
        }
    }

    #[test]
    fn integers_and_toggles_are_copied() {
        let cfg = to_binary(&StaConfigInput {
            channel: Some(11),
            listen_interval: Some(3),
            threshold_rssi: Some(-70),
            threshold_authmode: Some(3),
            sae_pwe: Some(2),
            rm: Some(true),
            mbo: Some(false),
            ..input()
        })
        .unwrap();
        assert_eq!(cfg.channel, 11);
        assert_eq!(cfg.listen_interval, 3);
        assert_eq!(cfg.threshold_rssi, -70);
        assert_eq!(cfg.threshold_authmode, 3);
        assert_eq!(cfg.sae_pwe_h2e, 2);
        assert!(cfg.rm_enabled);
        assert!(!cfg.btm_enabled);
        assert!(!cfg.mbo_enabled);
    }

    #[test]
    fn unknown_codes_are_dropped_on_read_back() {
        let cfg = StationConfig {
            scan_method: 9,
            sort_method: 9,
            ..StationConfig::default()
        };
        let view = from_binary(&cfg);
        assert_eq!(view.scan_method, None);
        assert_eq!(view.sort_by, None);
        assert_eq!(view.bssid, None);
        assert_eq!(view.pmf, PmfPolicy::AVAILABLE);
    }

    #[test]
    fn merge_keeps_base_fields() {
        let base = to_binary(&StaConfigInput {
            channel: Some(6),
            btm: Some(true),
            bssid: Some("a0:b1:c2:d3:e4:f5".into()),
            ..input()
        })
        .unwrap();
        let merged = StaConfigInput {
            ssid: Some("office".into()),
            ..Default::default()
        }
        .apply_to(&base)
        .unwrap();
        assert_eq!(merged.channel, 6);
        assert!(merged.btm_enabled);
        assert!(merged.bssid_set);
        assert_eq!(from_binary(&merged).ssid, "office");
        assert_eq!(from_binary(&merged).pwd, "hunter22");
    }

    #[test]
    fn shorter_ssid_clears_previous_bytes() {
        let base = to_binary(&StaConfigInput {
            ssid: Some("a-much-longer-name".into()),
            ..Default::default()
        })
        .unwrap();
        let merged = StaConfigInput {
            ssid: Some("short".into()),
            ..Default::default()
        }
        .apply_to(&base)
        .unwrap();
        assert_eq!(from_binary(&merged).ssid, "short");
    }

    #[test]
    fn view_converts_back_into_equivalent_input() {
        let cfg = to_binary(&StaConfigInput {
            bssid: Some("a0b1c2d3e4f5".into()),
            scan_method: Some("all".into()),
            sort_by: Some("rssi".into()),
            pmf: Some(PmfPolicy::REQUIRED),
            ..input()
        })
        .unwrap();
        let again = to_binary(&StaConfigInput::from(from_binary(&cfg))).unwrap();
        assert_eq!(again, cfg);
    }
}
