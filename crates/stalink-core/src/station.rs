// ── Station facade ──
//
// Host-facing surface of the module. Owns the driver, the network
// interface, the host callback bridge, the callback slots and the scan
// state. Everything here runs in one event-processing context.

use tracing::{debug, info, warn};

use crate::driver::{DriverEvent, EventBase, EventPayload, NetIf, WifiDriver};
use crate::error::{DriverCode, StationError};
use crate::host::CallbackHost;
use crate::model::{
    EventKind, MacAddress, PowerSave, ScanFilter, StaConfigInput, StaConfigView, StaticIp,
    from_binary, to_binary,
};
use crate::registry::{Delivery, EventRegistry, Route, route};
use crate::scan::{ScanCompletion, ScanCoordinator};

/// A WiFi station bound to one driver, one network interface and one
/// callback host.
///
/// # Serialization
///
/// [`Station::dispatch`] must never run concurrently with itself or with
/// any other method. The type enforces this through `&mut self`; callers
/// that bridge a driver event queue must keep a single consumer, as
/// [`crate::event_loop::run`] does.
pub struct Station<D, N, C: CallbackHost> {
    driver: D,
    netif: N,
    host: C,
    registry: EventRegistry<C::Handle>,
    scan: ScanCoordinator<C::Handle>,
}

impl<D, N, C> Station<D, N, C>
where
    D: WifiDriver,
    N: NetIf,
    C: CallbackHost,
{
    pub fn new(driver: D, netif: N, host: C) -> Self {
        Self {
            driver,
            netif,
            host,
            registry: EventRegistry::new(),
            scan: ScanCoordinator::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn netif(&self) -> &N {
        &self.netif
    }

    pub fn host(&self) -> &C {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut C {
        &mut self.host
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_in_flight()
    }

    /// Tear down into the collaborators. Pending subscriptions and any
    /// in-flight scan handle are dropped.
    pub fn into_parts(self) -> (D, N, C) {
        (self.driver, self.netif, self.host)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe `handle` to the named event, or clear the slot with
    /// `None`. Returns the handle that was replaced.
    pub fn subscribe(
        &mut self,
        name: &str,
        handle: Option<C::Handle>,
    ) -> Result<Option<C::Handle>, StationError> {
        self.registry.register(name, handle)
    }

    pub fn subscribe_kind(
        &mut self,
        kind: EventKind,
        handle: Option<C::Handle>,
    ) -> Option<C::Handle> {
        self.registry.subscribe(kind, handle)
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Replace the driver configuration with `input` merged onto an
    /// all-default record. Nothing is written when validation fails.
    pub fn configure(&mut self, input: &StaConfigInput, persist: bool) -> Result<(), StationError> {
        let cfg = to_binary(input)?;
        self.driver
            .set_config(&cfg, persist)
            .map_err(StationError::driver("set config"))?;
        info!(persist, "station configured");
        Ok(())
    }

    /// Merge `input` onto the current driver configuration.
    pub fn update(&mut self, input: &StaConfigInput, persist: bool) -> Result<(), StationError> {
        let current = self
            .driver
            .get_config()
            .map_err(StationError::driver("get config"))?;
        let cfg = input.apply_to(&current)?;
        self.driver
            .set_config(&cfg, persist)
            .map_err(StationError::driver("set config"))?;
        info!(persist, "station configuration updated");
        Ok(())
    }

    pub fn configuration(&mut self) -> Result<StaConfigView, StationError> {
        let cfg = self
            .driver
            .get_config()
            .map_err(StationError::driver("get config"))?;
        Ok(from_binary(&cfg))
    }

    // ── Link control ─────────────────────────────────────────────────

    pub fn connect(&mut self) -> Result<(), StationError> {
        self.driver
            .connect()
            .map_err(StationError::driver("connect"))
    }

    pub fn disconnect(&mut self) -> Result<(), StationError> {
        self.driver
            .disconnect()
            .map_err(StationError::driver("disconnect"))
    }

    /// Start a scan. `handle` is called exactly once when the driver
    /// reports completion.
    pub fn scan(&mut self, filter: &ScanFilter, handle: C::Handle) -> Result<(), StationError> {
        self.scan.start(&mut self.driver, filter, handle)
    }

    /// Switch to a static address. All addresses are parsed before the
    /// DHCP client is stopped.
    pub fn set_ip(&mut self, settings: &StaticIp) -> Result<(), StationError> {
        let (ip_info, dns) = settings.resolve()?;
        self.netif
            .stop_dhcp_client()
            .map_err(StationError::driver("stop dhcp client"))?;
        self.netif
            .set_ip_info(&ip_info)
            .map_err(StationError::driver("set ip info"))?;
        self.netif
            .set_dns_info(dns)
            .map_err(StationError::driver("set dns"))?;
        info!(ip = %ip_info.ip, gw = %ip_info.gw, %dns, "static address applied");
        Ok(())
    }

    pub fn set_hostname(&mut self, hostname: &str) -> Result<(), StationError> {
        self.netif
            .set_hostname(hostname)
            .map_err(StationError::driver("set hostname"))
    }

    /// Cap transmit power at `dbm`, rounded to the driver's 0.25 dBm step.
    pub fn set_tx_power(&mut self, dbm: f64) -> Result<(), StationError> {
        let quarter = quarter_dbm(dbm)?;
        debug!(dbm, quarter, "setting max tx power");
        self.driver
            .set_max_tx_power(quarter)
            .map_err(StationError::driver("set tx power"))
    }

    pub fn set_power_save(&mut self, mode: PowerSave) -> Result<(), StationError> {
        self.driver
            .set_power_save(mode.code())
            .map_err(StationError::driver("set power save"))
    }

    /// Current power-save level. A code outside the known set is treated
    /// as a driver failure carrying that code.
    pub fn power_save(&mut self) -> Result<PowerSave, StationError> {
        let code = self
            .driver
            .power_save()
            .map_err(StationError::driver("get power save"))?;
        PowerSave::from_code(code).ok_or_else(|| {
            warn!(code, "unknown power save mode");
            StationError::Driver {
                operation: "get power save",
                code: DriverCode(i32::try_from(code).unwrap_or(i32::MAX)),
            }
        })
    }

    pub fn mac(&mut self) -> Result<MacAddress, StationError> {
        self.driver
            .mac()
            .map(MacAddress::new)
            .map_err(StationError::driver("get mac"))
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Entry point for the underlying event system. Scan completion goes
    /// to the scan coordinator; every other pair goes to the registry.
    pub fn dispatch(&mut self, base: EventBase, id: i32, payload: &EventPayload) -> Delivery {
        if matches!(route(base, id), Some(Route::ScanDone)) {
            return match self.scan.complete(&mut self.driver, &mut self.host) {
                ScanCompletion::Ignored => Delivery::ScanIgnored,
                _ => Delivery::ScanCompleted,
            };
        }
        self.registry.dispatch(&mut self.host, base, id, payload)
    }

    pub fn handle_event(&mut self, event: &DriverEvent) -> Delivery {
        self.dispatch(event.base, event.id, &event.payload)
    }
}

fn quarter_dbm(dbm: f64) -> Result<i8, StationError> {
    // Half steps round up, toward positive infinity.
    let quarter = (dbm * 4.0 + 0.5).floor();
    if !quarter.is_finite() || quarter < f64::from(i8::MIN) || quarter > f64::from(i8::MAX) {
        return Err(StationError::invalid(
            "tx_power",
            format!("{dbm} dBm is outside the driver range"),
        ));
    }
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    let quarter = quarter as i8;
    Ok(quarter)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::driver::wifi_event;
    use crate::host::{Callback, FnHost, Invocation};
    use crate::model::PmfPolicy;
    use crate::sim::{Op, SimNetif, SimRadio};

    type TestStation = Station<SimRadio, SimNetif, FnHost>;

    fn station() -> TestStation {
        Station::new(SimRadio::new(), SimNetif::new(), FnHost::new())
    }

    #[test]
    fn configure_then_read_back() {
        let mut sta = station();
        let input = StaConfigInput {
            ssid: Some("lab".into()),
            pwd: Some("hunter22".into()),
            bssid: Some("AA BB CC 00 11 22".into()),
            pmf: Some(PmfPolicy::REQUIRED),
            ..Default::default()
        };
        sta.configure(&input, true).unwrap();
        assert_eq!(sta.driver().persisted(), Some(true));

        let view = sta.configuration().unwrap();
        assert_eq!(view.ssid, "lab");
        assert_eq!(view.pwd, "hunter22");
        assert_eq!(view.bssid.unwrap().to_string(), "aa:bb:cc:00:11:22");
        assert_eq!(view.pmf, PmfPolicy::REQUIRED);
    }

    #[test]
    fn invalid_configure_writes_nothing() {
        let mut sta = station();
        sta.configure(
            &StaConfigInput {
                ssid: Some("keep".into()),
                ..Default::default()
            },
            false,
        )
        .unwrap();
        let err = sta
            .configure(
                &StaConfigInput {
                    ssid: Some("other".into()),
                    sort_by: Some("loudest".into()),
                    ..Default::default()
                },
                false,
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("sort_by"));
        assert_eq!(sta.configuration().unwrap().ssid, "keep");
    }

    #[test]
    fn update_merges_onto_current() {
        let mut sta = station();
        sta.configure(
            &StaConfigInput {
                ssid: Some("lab".into()),
                channel: Some(6),
                ..Default::default()
            },
            false,
        )
        .unwrap();
        sta.update(
            &StaConfigInput {
                channel: Some(11),
                ..Default::default()
            },
            false,
        )
        .unwrap();
        let view = sta.configuration().unwrap();
        assert_eq!(view.ssid, "lab");
        assert_eq!(view.channel, 11);
    }

    #[test]
    fn driver_rejection_surfaces_code() {
        let mut sta = station();
        sta.driver_mut().fail(Op::Connect, DriverCode(0x3002));
        let err = sta.connect().unwrap_err();
        assert!(matches!(
            err,
            StationError::Driver {
                operation: "connect",
                code: DriverCode(0x3002)
            }
        ));
    }

    #[test]
    fn static_ip_defaults_dns_to_gateway() {
        let mut sta = station();
        sta.set_ip(&StaticIp {
            ip: "10.0.0.5".into(),
            netmask: "255.255.255.0".into(),
            gateway: "10.0.0.1".into(),
            dns: None,
        })
        .unwrap();
        assert!(!sta.netif().dhcp_running());
        assert_eq!(sta.netif().ip_info().unwrap().ip, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(sta.netif().dns(), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn bad_static_ip_leaves_dhcp_running() {
        let mut sta = station();
        let err = sta
            .set_ip(&StaticIp {
                ip: "10.0.0.5".into(),
                netmask: "255.255.255.0".into(),
                gateway: "10.0.0".into(),
                dns: None,
            })
            .unwrap_err();
        assert_eq!(err.field(), Some("gateway"));
        assert!(sta.netif().dhcp_running());
    }

    #[test]
    fn tx_power_is_rounded_to_quarter_dbm() {
        let mut sta = station();
        sta.set_tx_power(19.5).unwrap();
        assert_eq!(sta.driver().tx_power(), Some(78));
        sta.set_tx_power(8.1).unwrap();
        assert_eq!(sta.driver().tx_power(), Some(32));
        sta.set_tx_power(-1.125).unwrap();
        assert_eq!(sta.driver().tx_power(), Some(-4));
        sta.set_tx_power(0.125).unwrap();
        assert_eq!(sta.driver().tx_power(), Some(1));
        assert_eq!(
            sta.set_tx_power(40.0).unwrap_err().field(),
            Some("tx_power")
        );
        assert!(sta.set_tx_power(f64::NAN).is_err());
    }

    #[test]
    fn power_save_round_trip_and_unknown_code() {
        let mut sta = station();
        sta.set_power_save(PowerSave::Max).unwrap();
        assert_eq!(sta.power_save().unwrap(), PowerSave::Max);

        sta.driver_mut().set_power_save(7).unwrap();
        assert!(matches!(
            sta.power_save().unwrap_err(),
            StationError::Driver {
                code: DriverCode(7),
                ..
            }
        ));
    }

    #[test]
    fn mac_is_canonical() {
        let mut sta = station();
        assert_eq!(sta.mac().unwrap().to_string(), "24:0a:c4:00:00:01");
    }

    #[test]
    fn hostname_goes_to_netif() {
        let mut sta = station();
        sta.set_hostname("node-7").unwrap();
        assert_eq!(sta.netif().hostname(), Some("node-7"));
    }

    #[test]
    fn scan_done_bypasses_registry() {
        let mut sta = station();
        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let cb = Callback::new(move |call| {
            if let Invocation::ScanDone(_) = call {
                *counter.lock().unwrap() += 1;
            }
            Ok(())
        });

        assert_eq!(
            sta.dispatch(EventBase::Wifi, wifi_event::SCAN_DONE, &EventPayload::None),
            Delivery::ScanIgnored
        );
        sta.scan(&ScanFilter::default(), cb).unwrap();
        assert!(sta.is_scanning());
        assert_eq!(
            sta.dispatch(EventBase::Wifi, wifi_event::SCAN_DONE, &EventPayload::None),
            Delivery::ScanCompleted
        );
        assert!(!sta.is_scanning());
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn unknown_subscription_name_is_rejected() {
        let mut sta = station();
        assert!(matches!(
            sta.subscribe("roaming", Some(Callback::new(|_| Ok(())))),
            Err(StationError::UnknownEvent { .. })
        ));
    }
}
