// ── Core error types ──
//
// Synchronous failures surface as `StationError`. Scan retrieval failures
// travel through the scan callback as `ScanFailed`, and host-side handler
// failures are `HostError`, reported but never propagated.

use std::fmt;

use thiserror::Error;

/// Raw status code returned by a radio driver or netif primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverCode(pub i32);

impl DriverCode {
    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for DriverCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unified error type for station operations.
#[derive(Debug, Error)]
pub enum StationError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown event: {name}")]
    UnknownEvent { name: String },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("scan already in progress")]
    ScanAlreadyInProgress,

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("{operation} failed, code {code}")]
    Driver {
        operation: &'static str,
        code: DriverCode,
    },
}

impl StationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Adapter for `map_err` on driver results.
    pub(crate) fn driver(operation: &'static str) -> impl FnOnce(DriverCode) -> Self {
        move |code| Self::Driver { operation, code }
    }

    /// Name of the offending field for `InvalidField` errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Delivered to the scan callback when results could not be retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failure on scan done, code {code}")]
pub struct ScanFailed {
    pub code: DriverCode,
}

/// A host-side callback failed while handling a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("callback failed: {message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_carries_operation_and_code() {
        let err = Err::<(), _>(DriverCode(0x3007))
            .map_err(StationError::driver("connect"))
            .unwrap_err();
        assert_eq!(err.to_string(), "connect failed, code 12295");
    }

    #[test]
    fn scan_failed_keeps_generic_prefix() {
        let err = ScanFailed {
            code: DriverCode(259),
        };
        assert!(err.to_string().starts_with("failure on scan done"));
    }

    #[test]
    fn field_only_for_invalid_field() {
        assert_eq!(
            StationError::invalid("bssid", "bad").field(),
            Some("bssid")
        );
        assert_eq!(StationError::ScanAlreadyInProgress.field(), None);
    }
}
