// ── Event pump ──
//
// Single consumer of the driver event queue. Events are dispatched one at
// a time in arrival order, which is what `Station` requires.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::driver::{DriverEvent, NetIf, WifiDriver};
use crate::host::CallbackHost;
use crate::station::Station;

/// Drain `events` into `station` until the channel closes or `cancel`
/// fires. Returns the station so callers can inspect or reuse it.
pub async fn run<D, N, C>(
    mut station: Station<D, N, C>,
    mut events: mpsc::UnboundedReceiver<DriverEvent>,
    cancel: CancellationToken,
) -> Station<D, N, C>
where
    D: WifiDriver,
    N: NetIf,
    C: CallbackHost,
{
    let mut handled = 0usize;
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!(handled, "event pump cancelled");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    debug!(handled, "event queue closed");
                    break;
                };
                let delivery = station.handle_event(&event);
                trace!(base = ?event.base, id = event.id, ?delivery, "event handled");
                handled += 1;
            }
        }
    }
    station
}
