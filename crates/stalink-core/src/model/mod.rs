// ── Domain model ──
//
// Host-facing types: sparse configuration records, event records and
// scan results. Driver-facing layouts live in `crate::driver`.

pub mod config;
pub mod event;
pub mod link;
pub mod mac;
pub mod octets;
pub mod scan;

pub use config::{
    PmfPolicy, ScanMethod, SortMethod, StaConfigInput, StaConfigView, from_binary, to_binary,
};
pub use event::{
    AuthmodeChangedInfo, ConnectedInfo, DisconnectedInfo, EventInfo, EventKind, GotIpInfo,
};
pub use link::{PowerSave, StaticIp};
pub use mac::{InvalidMac, MacAddress};
pub use octets::OctetString;
pub use scan::{Bandwidth, ScanFilter, ScanResult};
