// ── Event registry and dispatcher ──
//
// A closed table maps (source, id) pairs from the event system to an
// `EventKind` and its field extractor. The registry owns at most one
// callback handle per kind; subscribing again replaces the old handle.
//
// Precondition: the event system serializes deliveries. Dispatch takes
// `&self` on the registry and `&mut` on the host, so handlers cannot
// reach back into the slot table during a delivery.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::driver::{EventBase, EventPayload, ip_event, wifi_event};
use crate::error::StationError;
use crate::host::{CallbackHost, Invocation};
use crate::model::{
    AuthmodeChangedInfo, ConnectedInfo, DisconnectedInfo, EventInfo, EventKind, GotIpInfo,
};

/// Populates an event record from a raw payload. `None` when the payload
/// does not have the shape the event promises.
pub type Extractor = fn(&EventPayload) -> Option<EventInfo>;

/// One row of the closed event table.
#[derive(Debug, Clone, Copy)]
pub struct EventDescriptor {
    pub kind: EventKind,
    pub base: EventBase,
    pub id: i32,
    pub extract: Extractor,
}

pub static EVENTS: [EventDescriptor; 6] = [
    EventDescriptor {
        kind: EventKind::Start,
        base: EventBase::Wifi,
        id: wifi_event::STA_START,
        extract: empty,
    },
    EventDescriptor {
        kind: EventKind::Stop,
        base: EventBase::Wifi,
        id: wifi_event::STA_STOP,
        extract: empty,
    },
    EventDescriptor {
        kind: EventKind::Connected,
        base: EventBase::Wifi,
        id: wifi_event::STA_CONNECTED,
        extract: connected,
    },
    EventDescriptor {
        kind: EventKind::Disconnected,
        base: EventBase::Wifi,
        id: wifi_event::STA_DISCONNECTED,
        extract: disconnected,
    },
    EventDescriptor {
        kind: EventKind::AuthmodeChanged,
        base: EventBase::Wifi,
        id: wifi_event::STA_AUTHMODE_CHANGE,
        extract: authmode_changed,
    },
    EventDescriptor {
        kind: EventKind::GotIp,
        base: EventBase::Ip,
        id: ip_event::STA_GOT_IP,
        extract: got_ip,
    },
];

fn empty(_: &EventPayload) -> Option<EventInfo> {
    Some(EventInfo::Empty {})
}

fn connected(payload: &EventPayload) -> Option<EventInfo> {
    match payload {
        EventPayload::StaConnected(raw) => Some(EventInfo::Connected(ConnectedInfo::from(raw))),
        _ => None,
    }
}

fn disconnected(payload: &EventPayload) -> Option<EventInfo> {
    match payload {
        EventPayload::StaDisconnected(raw) => {
            Some(EventInfo::Disconnected(DisconnectedInfo::from(raw)))
        }
        _ => None,
    }
}

fn authmode_changed(payload: &EventPayload) -> Option<EventInfo> {
    match payload {
        EventPayload::AuthmodeChange(raw) => {
            Some(EventInfo::AuthmodeChanged(AuthmodeChangedInfo::from(raw)))
        }
        _ => None,
    }
}

fn got_ip(payload: &EventPayload) -> Option<EventInfo> {
    match payload {
        EventPayload::GotIp(raw) => Some(EventInfo::GotIp(GotIpInfo::from(raw))),
        _ => None,
    }
}

/// Where an incoming (source, id) pair goes.
#[derive(Debug, Clone, Copy)]
pub enum Route {
    Event(&'static EventDescriptor),
    ScanDone,
}

/// Resolve an incoming event against the closed table.
pub fn route(base: EventBase, id: i32) -> Option<Route> {
    if base == EventBase::Wifi && id == wifi_event::SCAN_DONE {
        return Some(Route::ScanDone);
    }
    EVENTS
        .iter()
        .find(|desc| desc.base == base && desc.id == id)
        .map(Route::Event)
}

/// What happened to one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No table entry for the (source, id) pair.
    Unmatched,
    /// Known event, nobody subscribed.
    NoSubscriber(EventKind),
    /// Payload did not match the event's shape; nothing was called.
    Malformed(EventKind),
    Delivered(EventKind),
    /// The handler ran and failed; the failure was reported to the host.
    HandlerFailed(EventKind),
    /// Routed to the scan coordinator.
    ScanCompleted,
    /// Scan-done with no scan of ours in flight.
    ScanIgnored,
}

// ── Registry ─────────────────────────────────────────────────────────

/// Callback slots, one per [`EventKind`].
#[derive(Debug)]
pub struct EventRegistry<H> {
    slots: HashMap<EventKind, H>,
}

impl<H> Default for EventRegistry<H> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<H> EventRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe by event name. `None` clears the slot. Returns the handle
    /// that was replaced, if any.
    pub fn register(&mut self, name: &str, handle: Option<H>) -> Result<Option<H>, StationError> {
        let kind = name
            .parse::<EventKind>()
            .map_err(|_| StationError::UnknownEvent { name: name.into() })?;
        Ok(self.subscribe(kind, handle))
    }

    pub fn subscribe(&mut self, kind: EventKind, handle: Option<H>) -> Option<H> {
        debug!(event = %kind, subscribed = handle.is_some(), "updating event slot");
        match handle {
            Some(handle) => self.slots.insert(kind, handle),
            None => self.slots.remove(&kind),
        }
    }

    pub fn handler(&self, kind: EventKind) -> Option<&H> {
        self.slots.get(&kind)
    }

    /// Deliver one link event. Unknown pairs and empty slots are silent.
    pub fn dispatch<C>(
        &self,
        host: &mut C,
        base: EventBase,
        id: i32,
        payload: &EventPayload,
    ) -> Delivery
    where
        C: CallbackHost<Handle = H>,
    {
        let desc = match route(base, id) {
            Some(Route::Event(desc)) => desc,
            Some(Route::ScanDone) | None => {
                trace!(?base, id, "no registry entry for event");
                return Delivery::Unmatched;
            }
        };
        let Some(handle) = self.slots.get(&desc.kind) else {
            trace!(event = %desc.kind, "no subscriber");
            return Delivery::NoSubscriber(desc.kind);
        };
        let Some(info) = (desc.extract)(payload) else {
            warn!(event = %desc.kind, ?payload, "payload does not match event");
            return Delivery::Malformed(desc.kind);
        };

        debug!(event = %desc.kind, "delivering event");
        let call = Invocation::Event {
            kind: desc.kind,
            info: &info,
        };
        match host.invoke(handle, call) {
            Ok(()) => Delivery::Delivered(desc.kind),
            Err(err) => {
                host.report(&err);
                Delivery::HandlerFailed(desc.kind)
            }
        }
    }
}
