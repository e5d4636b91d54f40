//! Station profiles for stalink.
//!
//! TOML profiles layered with `STALINK_` environment overrides, secret
//! resolution for the pre-shared key, and validation against the core
//! marshaller so a bad profile fails before any driver call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use stalink_core::{PowerSave, ScanFilter, StaConfigInput, StaticIp, StationError, to_binary};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    NoProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn station(prefix: &str, err: &StationError) -> Self {
        Self::Validation {
            field: match err.field() {
                Some(field) => format!("{prefix}.{field}"),
                None => prefix.into(),
            },
            reason: err.to_string(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named station profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Store configuration in flash rather than RAM.
    #[serde(default)]
    pub persist: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            persist: false,
        }
    }
}

fn default_output() -> String {
    "table".into()
}

/// A named station profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Sparse station record, marshalled as-is.
    #[serde(default)]
    pub station: StaConfigInput,

    /// Environment variable holding the pre-shared key. Wins over
    /// `station.pwd` when set.
    pub pwd_env: Option<String>,

    /// Override `defaults.persist`.
    pub persist: Option<bool>,

    #[serde(default)]
    pub scan: ScanFilter,

    pub static_ip: Option<StaticIp>,

    pub hostname: Option<String>,

    pub power_save: Option<PowerSave>,

    /// Transmit power cap in dBm.
    pub tx_power: Option<f64>,
}

impl Profile {
    /// Run every section through the core parsers without touching a
    /// driver.
    pub fn validate(&self) -> Result<(), ConfigError> {
        to_binary(&self.station).map_err(|e| ConfigError::station("station", &e))?;
        self.scan
            .to_driver_config()
            .map_err(|e| ConfigError::station("scan", &e))?;
        if let Some(ip) = &self.static_ip {
            ip.resolve()
                .map_err(|e| ConfigError::station("static_ip", &e))?;
        }
        if let Some(dbm) = self.tx_power.filter(|dbm| !dbm.is_finite()) {
            return Err(ConfigError::Validation {
                field: "tx_power".into(),
                reason: format!("expected a number of dBm, got {dbm}"),
            });
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "stalink", "stalink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stalink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from `path` + environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STALINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Pick `name`, else the configured default, else `"default"`.
pub fn active_profile<'a>(
    cfg: &'a Config,
    name: Option<&str>,
) -> Result<(String, &'a Profile), ConfigError> {
    let name = name
        .or(cfg.default_profile.as_deref())
        .unwrap_or("default")
        .to_owned();
    let profile = cfg
        .profiles
        .get(&name)
        .ok_or_else(|| ConfigError::NoProfile {
            profile: name.clone(),
        })?;
    Ok((name, profile))
}

/// The profile's station record with the pre-shared key resolved from
/// the process environment.
pub fn resolve_station(profile: &Profile) -> Result<StaConfigInput, ConfigError> {
    resolve_station_with(profile, |var| std::env::var(var).ok())
}

/// [`resolve_station`] with an explicit environment lookup.
pub fn resolve_station_with(
    profile: &Profile,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<StaConfigInput, ConfigError> {
    let mut station = profile.station.clone();
    if let Some(ref env_name) = profile.pwd_env {
        match lookup(env_name) {
            Some(pwd) => station.pwd = Some(pwd.into()),
            None if station.pwd.is_some() => {
                debug!(var = %env_name, "pwd_env unset, using plaintext pwd");
            }
            None => {
                return Err(ConfigError::Validation {
                    field: "pwd_env".into(),
                    reason: format!("environment variable {env_name} is not set"),
                });
            }
        }
    }
    Ok(station)
}

/// Whether the profile's configuration should be stored in flash.
pub fn persist(cfg: &Config, profile: &Profile) -> bool {
    profile.persist.unwrap_or(cfg.defaults.persist)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile_with_pwd(pwd: Option<&str>, env: Option<&str>) -> Profile {
        Profile {
            station: StaConfigInput {
                ssid: Some("lab".into()),
                pwd: pwd.map(Into::into),
                ..Default::default()
            },
            pwd_env: env.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn pwd_env_wins_over_plaintext() {
        let profile = profile_with_pwd(Some("plain"), Some("LAB_PSK"));
        let station =
            resolve_station_with(&profile, |var| (var == "LAB_PSK").then(|| "secret".into()))
                .unwrap();
        assert_eq!(station.pwd, Some("secret".into()));
    }

    #[test]
    fn unset_pwd_env_falls_back_or_fails() {
        let with_plain = profile_with_pwd(Some("plain"), Some("LAB_PSK"));
        let station = resolve_station_with(&with_plain, |_| None).unwrap();
        assert_eq!(station.pwd, Some("plain".into()));

        let without = profile_with_pwd(None, Some("LAB_PSK"));
        let err = resolve_station_with(&without, |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "pwd_env"));
    }

    #[test]
    fn validation_names_section_and_field() {
        let mut profile = profile_with_pwd(None, None);
        profile.station.scan_method = Some("slow".into());
        let err = profile.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation { ref field, .. } if field == "station.scan_method"
        ));

        let mut profile = profile_with_pwd(None, None);
        profile.scan.bssid = Some("zz:zz".into());
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "scan.bssid"));
    }

    #[test]
    fn any_pmf_code_is_accepted() {
        for code in [0, 1, 2, 9] {
            let mut profile = profile_with_pwd(None, None);
            profile.station.pmf = Some(code);
            assert!(profile.validate().is_ok(), "{code}");
        }
    }

    #[test]
    fn active_profile_falls_back_to_default_name() {
        let mut cfg = Config::default();
        assert!(matches!(
            active_profile(&cfg, None),
            Err(ConfigError::NoProfile { .. })
        ));
        cfg.profiles.insert("default".into(), Profile::default());
        let (name, _) = active_profile(&cfg, None).unwrap();
        assert_eq!(name, "default");
    }
}
