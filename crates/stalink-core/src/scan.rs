// ── Scan coordinator ──
//
// One outstanding scan at a time. The callback handle only exists inside
// `ScanState::InFlight`, so "in flight" and "has a callback" cannot drift
// apart. Completion always returns the state to `Idle`, whatever happens
// while fetching results or running the callback.

use std::mem;

use tracing::{debug, trace, warn};

use crate::driver::WifiDriver;
use crate::error::{ScanFailed, StationError};
use crate::host::{CallbackHost, Invocation};
use crate::model::{ScanFilter, ScanResult};

#[derive(Debug)]
pub enum ScanState<H> {
    Idle,
    InFlight {
        handle: H,
    },
}

/// How a scan-done notification was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCompletion {
    /// No scan of ours was in flight; nothing was called.
    Ignored,
    /// Callback ran with `count` results.
    Delivered { count: usize },
    /// Callback ran with the retrieval error.
    RetrievalFailed,
    /// Callback itself failed; reported to the host.
    CallbackFailed,
}

#[derive(Debug)]
pub struct ScanCoordinator<H> {
    state: ScanState<H>,
}

impl<H> Default for ScanCoordinator<H> {
    fn default() -> Self {
        Self {
            state: ScanState::Idle,
        }
    }
}

impl<H> ScanCoordinator<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScanState<H> {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, ScanState::InFlight { .. })
    }

    /// Ask the driver to start a scan. On any failure the handle is dropped
    /// and the state is left as it was.
    pub fn start<D: WifiDriver>(
        &mut self,
        driver: &mut D,
        filter: &ScanFilter,
        handle: H,
    ) -> Result<(), StationError> {
        if self.is_in_flight() {
            return Err(StationError::ScanAlreadyInProgress);
        }
        let config = filter.to_driver_config()?;
        driver
            .scan_start(&config)
            .map_err(StationError::driver("start scan"))?;

        debug!(channel = config.channel, hidden = config.show_hidden, "scan started");
        self.state = ScanState::InFlight { handle };
        Ok(())
    }

    /// Handle the driver's scan-done notification.
    pub fn complete<D, C>(&mut self, driver: &mut D, host: &mut C) -> ScanCompletion
    where
        D: WifiDriver,
        C: CallbackHost<Handle = H>,
    {
        let ScanState::InFlight { handle } = mem::replace(&mut self.state, ScanState::Idle) else {
            trace!("scan done without a pending request");
            return ScanCompletion::Ignored;
        };

        let outcome = fetch_results(driver);
        let call = match &outcome {
            Ok(results) => Invocation::ScanDone(Ok(results)),
            Err(failed) => {
                warn!(error = %failed, "could not retrieve scan results");
                Invocation::ScanDone(Err(failed))
            }
        };
        let completion = match host.invoke(&handle, call) {
            Ok(()) => match &outcome {
                Ok(results) => ScanCompletion::Delivered {
                    count: results.len(),
                },
                Err(_) => ScanCompletion::RetrievalFailed,
            },
            Err(err) => {
                host.report(&err);
                ScanCompletion::CallbackFailed
            }
        };
        debug!(?completion, "scan complete");
        completion
    }
}

fn fetch_results<D: WifiDriver>(driver: &mut D) -> Result<Vec<ScanResult>, ScanFailed> {
    let count = driver
        .scan_ap_count()
        .map_err(|code| ScanFailed { code })?;
    let records = driver
        .scan_ap_records(count)
        .map_err(|code| ScanFailed { code })?;
    Ok(records
        .iter()
        .take(usize::from(count))
        .map(ScanResult::from)
        .collect())
}
