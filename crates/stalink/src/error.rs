//! CLI error types with miette diagnostics.
//!
//! Maps `StationError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use stalink_config::ConfigError;
use stalink_core::StationError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const DRIVER: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(stalink::validation),
        help("Fix the field in the profile, or override it with STALINK_PROFILES__<name>__<section>__<field>.")
    )]
    Validation { field: String, reason: String },

    #[error("Unknown event '{name}'")]
    #[diagnostic(
        code(stalink::unknown_event),
        help("Run: stalink events to list subscribable events")
    )]
    UnknownEvent { name: String },

    // ── Station ──────────────────────────────────────────────────────
    #[error("A scan is already in progress")]
    #[diagnostic(
        code(stalink::scan_busy),
        help("Wait for the scan-done callback before starting another scan.")
    )]
    ScanBusy,

    #[error("Driver rejected {operation} (code {code})")]
    #[diagnostic(code(stalink::driver))]
    Driver { operation: String, code: i32 },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(stalink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Config file: {path}"
        )
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error(transparent)]
    #[diagnostic(code(stalink::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(stalink::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::UnknownEvent { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::ScanBusy => exit_code::CONFLICT,
            Self::Driver { .. } => exit_code::DRIVER,
            Self::Config(_) | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }

    /// Attach the profile list and config path to a missing-profile error.
    pub fn from_config(err: ConfigError, available: &[&str], path: &str) -> Self {
        match err {
            ConfigError::NoProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
                path: path.into(),
            },
            other => other.into(),
        }
    }
}

// ── StationError → CliError mapping ──────────────────────────────────

impl From<StationError> for CliError {
    fn from(err: StationError) -> Self {
        match err {
            StationError::InvalidField { field, reason } => Self::Validation {
                field: field.into(),
                reason,
            },
            StationError::UnknownEvent { name } => Self::UnknownEvent { name },
            StationError::ScanAlreadyInProgress => Self::ScanBusy,
            StationError::Driver { operation, code } => Self::Driver {
                operation: operation.into(),
                code: code.code(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: "(unknown)".into(),
                path: "(unknown)".into(),
            },
            ConfigError::Serialization(e) => Self::Render(e.to_string()),
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}
