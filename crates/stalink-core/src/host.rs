// ── Host callback seam ──
//
// The host runtime owns its callback handles; this crate only stores them
// and asks the host to call them. A failing call is reported through
// `CallbackHost::report` and never propagates into dispatch.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::error::{HostError, ScanFailed};
use crate::model::{EventInfo, EventKind, ScanResult};

/// Arguments for one callback invocation.
#[derive(Debug, Clone, Copy)]
pub enum Invocation<'a> {
    /// `(event_name, record)` for a subscribed link event.
    Event { kind: EventKind, info: &'a EventInfo },
    /// `(error, results)` for a completed scan. On failure no results are
    /// passed.
    ScanDone(Result<&'a [ScanResult], &'a ScanFailed>),
}

/// The host's generic "call this handle with these arguments" primitive.
pub trait CallbackHost {
    /// Opaque reference to a host callback.
    type Handle;

    fn invoke(&mut self, handle: &Self::Handle, call: Invocation<'_>) -> Result<(), HostError>;

    /// The host's error channel. The default only logs.
    fn report(&mut self, error: &HostError) {
        warn!(error = %error, "host callback failed");
    }
}

// ── Closure host ─────────────────────────────────────────────────────

type CallbackFn = dyn Fn(Invocation<'_>) -> Result<(), HostError> + Send + Sync;

/// A callback handle backed by a Rust closure.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    pub fn new(f: impl Fn(Invocation<'_>) -> Result<(), HostError> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Identity comparison: true when both handles share one closure.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// [`CallbackHost`] whose handles are plain closures. Failures are logged
/// and kept so callers can inspect them.
#[derive(Debug, Default)]
pub struct FnHost {
    failures: Vec<HostError>,
}

impl FnHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[HostError] {
        &self.failures
    }
}

impl CallbackHost for FnHost {
    type Handle = Callback;

    fn invoke(&mut self, handle: &Callback, call: Invocation<'_>) -> Result<(), HostError> {
        (handle.0)(call)
    }

    fn report(&mut self, error: &HostError) {
        warn!(error = %error, "host callback failed");
        self.failures.push(error.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn callback_identity() {
        let a = Callback::new(|_| Ok(()));
        let b = a.clone();
        let c = Callback::new(|_| Ok(()));
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn fn_host_invokes_and_records_reports() {
        let mut host = FnHost::new();
        let cb = Callback::new(|_| Err(HostError::new("boom")));
        let info = EventInfo::Empty {};
        let err = host
            .invoke(
                &cb,
                Invocation::Event {
                    kind: EventKind::Start,
                    info: &info,
                },
            )
            .unwrap_err();
        host.report(&err);
        assert_eq!(host.failures(), [HostError::new("boom")]);
    }
}
