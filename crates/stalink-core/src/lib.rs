//! Station-mode WiFi control and event bridge.
//!
//! This crate sits between a radio driver and a scripting host that wants
//! to configure the station, react to link events and run scans:
//!
//! - **[`Station`]**: Facade over a [`WifiDriver`], a [`NetIf`] and a
//!   [`CallbackHost`]. Exposes `configure` / `update` / `configuration`,
//!   `connect` / `disconnect`, `scan`, and the link-level knobs (static IP,
//!   hostname, transmit power, power save).
//!
//! - **[`EventRegistry`]**: One callback slot per [`EventKind`]. A closed
//!   table maps the event system's (source, id) pairs to kinds and field
//!   extractors; unknown pairs are dropped silently.
//!
//! - **[`ScanCoordinator`]**: At most one scan in flight. The completion
//!   callback fires exactly once, with results or with a [`ScanFailed`].
//!
//! - **Configuration marshalling** ([`model::config`]): Sparse
//!   [`StaConfigInput`] records merged onto the driver's fixed
//!   [`StationConfig`] layout, and projected back as [`StaConfigView`].
//!
//! - **[`event_loop::run`]**: Async single consumer feeding driver events
//!   into a station in arrival order.
//!
//! [`sim`] provides an in-memory radio and network interface for tests and
//! demos.

pub mod driver;
pub mod error;
pub mod event_loop;
pub mod host;
pub mod model;
pub mod registry;
pub mod scan;
pub mod sim;
pub mod station;

// ── Primary re-exports ──────────────────────────────────────────────
pub use driver::{DriverEvent, EventBase, EventPayload, NetIf, StationConfig, WifiDriver};
pub use error::{DriverCode, HostError, ScanFailed, StationError};
pub use host::{Callback, CallbackHost, FnHost, Invocation};
pub use registry::{Delivery, EventRegistry};
pub use scan::{ScanCompletion, ScanCoordinator, ScanState};
pub use station::Station;

pub use model::{
    Bandwidth, EventInfo, EventKind, MacAddress, OctetString, PmfPolicy, PowerSave, ScanFilter,
    ScanMethod, ScanResult, SortMethod, StaConfigInput, StaConfigView, StaticIp, from_binary, to_binary,
};
