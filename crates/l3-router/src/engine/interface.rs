//! Router interface, MAC list and counter calls.

use l3_orch_common::BufferFill;
use l3_sdk::{AccessCmd, CounterReadMode, RifId, RouterError, RouterResult, VendorExt, VrId};
use l3_types::MacAddress;

use super::L3Router;
use crate::counter::{CounterDirection, RifCounter, RifCounterSnapshot};
use crate::intfs::{InterfaceOp, MacListOp, RifAdminState, RifAttributes, RifBinding, RouterInterface};
use crate::table::{read, write};
use std::sync::Arc;

const INTFS: &str = "interface table";

impl L3Router {
    /// Creates, modifies or deletes router interfaces from a raw command.
    ///
    /// Returns the rif the command applied to: the allocated one for ADD,
    /// `None` for DELETE_ALL.
    pub fn interface_set(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        rif: Option<RifId>,
        binding: Option<RifBinding>,
        attrs: Option<&RifAttributes>,
        ext: Option<&VendorExt>,
    ) -> RouterResult<Option<RifId>> {
        self.vendor_ext("interface_set", ext);
        self.interface_apply(vrid, InterfaceOp::from_cmd(cmd, rif, binding, attrs)?)
    }

    pub fn interface_apply(&self, vrid: VrId, op: InterfaceOp) -> RouterResult<Option<RifId>> {
        self.with_router(vrid, |router| {
            let mut intfs = write(&router.tables.intfs, INTFS)?;
            match op {
                InterfaceOp::Add { binding, attrs } => {
                    let rif = intfs.add_rif(binding, attrs)?;
                    self.notify(|cb| cb.on_rif_added(vrid, rif, &binding));
                    Ok(Some(rif))
                }
                InterfaceOp::Edit { rif, binding, attrs } => {
                    intfs.edit_rif(rif, binding, attrs)?;
                    Ok(Some(rif))
                }
                InterfaceOp::Delete(rif) => {
                    intfs.remove_rif(rif)?;
                    self.notify(|cb| cb.on_rif_removed(vrid, rif));
                    Ok(Some(rif))
                }
                InterfaceOp::DeleteAll => {
                    for rif in intfs.remove_all()? {
                        self.notify(|cb| cb.on_rif_removed(vrid, rif));
                    }
                    Ok(None)
                }
            }
        })
    }

    pub fn interface_get(
        &self,
        vrid: VrId,
        rif: RifId,
        ext: Option<&VendorExt>,
    ) -> RouterResult<RouterInterface> {
        self.vendor_ext("interface_get", ext);
        self.with_router(vrid, |router| read(&router.tables.intfs, INTFS)?.get_rif(rif))
    }

    pub fn interface_state_set(
        &self,
        vrid: VrId,
        rif: RifId,
        state: RifAdminState,
        ext: Option<&VendorExt>,
    ) -> RouterResult<()> {
        self.vendor_ext("interface_state_set", ext);
        self.with_router(vrid, |router| {
            write(&router.tables.intfs, INTFS)?.set_admin_state(rif, state)
        })
    }

    pub fn interface_state_get(
        &self,
        vrid: VrId,
        rif: RifId,
        ext: Option<&VendorExt>,
    ) -> RouterResult<RifAdminState> {
        self.vendor_ext("interface_state_get", ext);
        self.with_router(vrid, |router| read(&router.tables.intfs, INTFS)?.admin_state(rif))
    }

    /// Adds, deletes or clears the additional MACs of an interface.
    pub fn interface_mac_set(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        rif: RifId,
        macs: &[MacAddress],
        ext: Option<&VendorExt>,
    ) -> RouterResult<()> {
        self.vendor_ext("interface_mac_set", ext);
        let op = MacListOp::from_cmd(cmd, macs)?;
        self.with_router(vrid, |router| {
            write(&router.tables.intfs, INTFS)?.apply_mac_op(rif, op)
        })
    }

    /// Copies up to `capacity` additional MACs of an interface.
    ///
    /// `total` in the result is the full list length; a capacity of 0 only
    /// counts.
    pub fn interface_mac_get(
        &self,
        vrid: VrId,
        rif: RifId,
        capacity: usize,
        ext: Option<&VendorExt>,
    ) -> RouterResult<BufferFill<MacAddress>> {
        self.vendor_ext("interface_mac_get", ext);
        self.with_router(vrid, |router| {
            read(&router.tables.intfs, INTFS)?.mac_list(rif, capacity)
        })
    }

    /// Allocates (ADD) or releases (DELETE) the counter of an interface.
    pub fn interface_counter_set(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        rif: RifId,
        ext: Option<&VendorExt>,
    ) -> RouterResult<()> {
        self.vendor_ext("interface_counter_set", ext);
        self.with_router(vrid, |router| {
            let mut intfs = write(&router.tables.intfs, INTFS)?;
            match cmd {
                AccessCmd::Add => intfs.enable_counter(rif),
                AccessCmd::Delete => intfs.disable_counter(rif),
                other => Err(RouterError::cmd_unsupported(other, "interface_counter_set")),
            }
        })
    }

    /// Reads (READ) or reads and clears (READ_CLEAR) an interface counter.
    pub fn interface_counter_get(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        rif: RifId,
        ext: Option<&VendorExt>,
    ) -> RouterResult<RifCounterSnapshot> {
        self.vendor_ext("interface_counter_get", ext);
        let mode = CounterReadMode::try_from(cmd)?;
        let counter = self
            .rif_counter(vrid, rif)?
            .ok_or_else(|| RouterError::not_found(format!("counter of {}", rif)))?;
        Ok(counter.read(mode))
    }

    fn rif_counter(&self, vrid: VrId, rif: RifId) -> RouterResult<Option<Arc<RifCounter>>> {
        self.with_router(vrid, |router| read(&router.tables.intfs, INTFS)?.counter(rif))
    }

    /// Runs `f` on the counter of an interface; no-op without a counter.
    fn with_counter(&self, vrid: VrId, rif: RifId, f: impl FnOnce(&RifCounter)) -> RouterResult<()> {
        if let Some(counter) = self.rif_counter(vrid, rif)? {
            f(&counter);
        }
        Ok(())
    }

    pub fn rif_count_ingress(&self, vrid: VrId, rif: RifId, packets: u64, bytes: u64) -> RouterResult<()> {
        self.with_counter(vrid, rif, |c| c.count(CounterDirection::Ingress, packets, bytes))
    }

    pub fn rif_count_egress(&self, vrid: VrId, rif: RifId, packets: u64, bytes: u64) -> RouterResult<()> {
        self.with_counter(vrid, rif, |c| c.count(CounterDirection::Egress, packets, bytes))
    }

    pub fn rif_count_drop(
        &self,
        vrid: VrId,
        rif: RifId,
        direction: CounterDirection,
        packets: u64,
    ) -> RouterResult<()> {
        self.with_counter(vrid, rif, |c| c.count_drops(direction, packets))
    }

    pub fn rif_count_error(
        &self,
        vrid: VrId,
        rif: RifId,
        direction: CounterDirection,
        packets: u64,
    ) -> RouterResult<()> {
        self.with_counter(vrid, rif, |c| c.count_errors(direction, packets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::vrf::RouterAttributes;
    use l3_sdk::Status;
    use l3_types::{AdminState, IpFamily, PortId};
    use pretty_assertions::assert_eq;

    fn setup() -> (L3Router, VrId, RifId) {
        let router = L3Router::new(RouterConfig::default()).unwrap();
        let vrid = router
            .router_set(AccessCmd::Add, None, Some(&RouterAttributes::default()), None)
            .unwrap();
        let rif = router
            .interface_set(
                AccessCmd::Add,
                vrid,
                None,
                Some(RifBinding::Port(PortId::new(1).unwrap())),
                Some(&RifAttributes::new("00:11:22:33:44:55".parse().unwrap(), 1500)),
                None,
            )
            .unwrap()
            .unwrap();
        (router, vrid, rif)
    }

    #[test]
    fn test_add_then_get() {
        let (router, vrid, rif) = setup();
        let got = router.interface_get(vrid, rif, None).unwrap();
        assert_eq!(got.binding, RifBinding::Port(PortId::new(1).unwrap()));
        assert_eq!(got.attrs.mtu, 1500);
        assert!(!got.counter_enabled);
    }

    #[test]
    fn test_admin_state() {
        let (router, vrid, rif) = setup();
        let mut state = RifAdminState::all(AdminState::Up);
        state.ipv6_uc = AdminState::Down;
        router.interface_state_set(vrid, rif, state, None).unwrap();

        let got = router.interface_state_get(vrid, rif, None).unwrap();
        assert_eq!(got.unicast(IpFamily::V6), AdminState::Down);
        assert_eq!(got.unicast(IpFamily::V4), AdminState::Up);
    }

    #[test]
    fn test_mac_list_count_only() {
        let (router, vrid, rif) = setup();
        let macs: Vec<MacAddress> = ["00:00:00:00:00:01", "00:00:00:00:00:02"]
            .iter()
            .map(|m| m.parse().unwrap())
            .collect();
        router
            .interface_mac_set(AccessCmd::Add, vrid, rif, &macs, None)
            .unwrap();

        let counted = router.interface_mac_get(vrid, rif, 0, None).unwrap();
        assert_eq!((counted.items.len(), counted.total), (0, 2));
        let full = router.interface_mac_get(vrid, rif, 8, None).unwrap();
        assert_eq!(full.items, macs);

        router
            .interface_mac_set(AccessCmd::DeleteAll, vrid, rif, &[], None)
            .unwrap();
        assert_eq!(router.interface_mac_get(vrid, rif, 8, None).unwrap().total, 0);
    }

    #[test]
    fn test_counter_lifecycle() {
        let (router, vrid, rif) = setup();
        router.rif_count_ingress(vrid, rif, 5, 500).unwrap();
        let err = router
            .interface_counter_get(AccessCmd::Read, vrid, rif, None)
            .unwrap_err();
        assert!(err.is_not_found());

        router
            .interface_counter_set(AccessCmd::Add, vrid, rif, None)
            .unwrap();
        router.rif_count_ingress(vrid, rif, 3, 300).unwrap();
        router.rif_count_egress(vrid, rif, 2, 128).unwrap();
        router
            .rif_count_drop(vrid, rif, CounterDirection::Ingress, 1)
            .unwrap();

        let snap = router
            .interface_counter_get(AccessCmd::ReadClear, vrid, rif, None)
            .unwrap();
        assert_eq!(snap.ingress.packets, 3);
        assert_eq!(snap.ingress.bytes, 300);
        assert_eq!(snap.ingress.drops, 1);
        assert_eq!(snap.egress.packets, 2);
        assert!(snap.last_cleared.is_some());

        let snap = router
            .interface_counter_get(AccessCmd::Read, vrid, rif, None)
            .unwrap();
        assert_eq!(snap.ingress.packets, 0);

        let err = router
            .interface_set(AccessCmd::Delete, vrid, Some(rif), None, None, None)
            .unwrap_err();
        assert_eq!(err.status(), Status::ResourceInUse);

        router
            .interface_counter_set(AccessCmd::Delete, vrid, rif, None)
            .unwrap();
        router
            .interface_set(AccessCmd::Delete, vrid, Some(rif), None, None, None)
            .unwrap();
    }

    #[test]
    fn test_counter_commands() {
        let (router, vrid, rif) = setup();
        let err = router
            .interface_counter_set(AccessCmd::Edit, vrid, rif, None)
            .unwrap_err();
        assert_eq!(err.status(), Status::CmdUnsupported);
        let err = router
            .interface_counter_get(AccessCmd::GetNext, vrid, rif, None)
            .unwrap_err();
        assert_eq!(err.status(), Status::CmdUnsupported);
    }

    #[test]
    fn test_count_on_missing_rif() {
        let (router, vrid, _) = setup();
        let err = router
            .rif_count_ingress(vrid, RifId::new(77), 1, 64)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
