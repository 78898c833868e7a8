//! Unicast and multicast FIB calls, and ECMP member selection.

use l3_orch_common::BufferFill;
use l3_sdk::{AccessCmd, Query, RifId, RouterError, RouterResult, VendorExt, VrId};
use l3_types::{IpAddress, IpPrefix};

use super::L3Router;
use crate::ecmp::{select_index, FlowKey};
use crate::mcast::{EgressOp, McRouteData, McRouteEntry, McRouteKey, McRouteOp};
use crate::route::{NextHop, UcRouteData, UcRouteEntry, UcRouteOp};
use crate::table::{read, write};

const INTFS: &str = "interface table";
const NEIGH: &str = "neighbor table";
const ROUTES: &str = "unicast route table";
const MCAST: &str = "multicast route table";

impl L3Router {
    /// Adds, sets, deletes or clears unicast routes from a raw command.
    pub fn uc_route_set(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        key: Option<IpPrefix>,
        data: Option<&UcRouteData>,
        ext: Option<&VendorExt>,
    ) -> RouterResult<()> {
        self.vendor_ext("uc_route_set", ext);
        self.uc_route_apply(vrid, UcRouteOp::from_cmd(cmd, key, data)?)
    }

    pub fn uc_route_apply(&self, vrid: VrId, op: UcRouteOp) -> RouterResult<()> {
        self.with_router(vrid, |router| {
            let mut intfs = write(&router.tables.intfs, INTFS)?;
            let mut routes = write(&router.tables.routes, ROUTES)?;
            if matches!(op, UcRouteOp::Add(..) | UcRouteOp::Set(..)) {
                router.require_unicast()?;
            }
            match op {
                UcRouteOp::Add(prefix, data) => {
                    routes.add_route(&mut intfs, prefix, data.clone())?;
                    self.notify(|cb| cb.on_uc_route_set(vrid, &prefix, &data));
                }
                UcRouteOp::Set(prefix, data) => {
                    routes.set_route(&mut intfs, prefix, data.clone())?;
                    self.notify(|cb| cb.on_uc_route_set(vrid, &prefix, &data));
                }
                UcRouteOp::Delete(prefix) => {
                    routes.remove_route(&mut intfs, &prefix)?;
                    self.notify(|cb| cb.on_uc_route_removed(vrid, &prefix));
                }
                UcRouteOp::DeleteAll => {
                    for prefix in routes.remove_all(&mut intfs) {
                        self.notify(|cb| cb.on_uc_route_removed(vrid, &prefix));
                    }
                }
            }
            Ok(())
        })
    }

    /// Reads unicast routes with GET, GET_FIRST or GET_NEXT.
    pub fn uc_route_get(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        key: Option<IpPrefix>,
        count: usize,
        ext: Option<&VendorExt>,
    ) -> RouterResult<Vec<UcRouteEntry>> {
        self.vendor_ext("uc_route_get", ext);
        self.uc_route_query(vrid, &Query::from_cmd(cmd, key, count)?)
    }

    pub fn uc_route_query(&self, vrid: VrId, query: &Query<IpPrefix>) -> RouterResult<Vec<UcRouteEntry>> {
        self.with_router(vrid, |router| read(&router.tables.routes, ROUTES)?.query(query))
    }

    /// Longest-prefix match of `addr` in the unicast FIB of a router.
    pub fn uc_route_lookup(&self, vrid: VrId, addr: &IpAddress) -> RouterResult<Option<UcRouteEntry>> {
        self.with_router(vrid, |router| Ok(read(&router.tables.routes, ROUTES)?.lookup(addr)))
    }

    /// Next hops of a route that have no neighbor entry yet.
    pub fn uc_route_unresolved(&self, vrid: VrId, prefix: &IpPrefix) -> RouterResult<Vec<NextHop>> {
        self.with_router(vrid, |router| {
            let neigh = read(&router.tables.neigh, NEIGH)?;
            let routes = read(&router.tables.routes, ROUTES)?;
            routes.unresolved(prefix, &neigh)
        })
    }

    /// Picks the next hop of a forwarding route for a flow.
    ///
    /// Next hops whose interface has unicast routing down for the route's
    /// family are skipped, and none are usable while the router itself has
    /// that family down.
    pub fn ecmp_select(&self, vrid: VrId, prefix: &IpPrefix, flow: &FlowKey) -> RouterResult<NextHop> {
        self.with_router(vrid, |router| {
            let intfs = read(&router.tables.intfs, INTFS)?;
            let routes = read(&router.tables.routes, ROUTES)?;
            let data = routes
                .get_route(prefix)
                .ok_or_else(|| RouterError::not_found(format!("route {} in {}", prefix, vrid)))?;
            if !data.action.is_forward() {
                return Err(RouterError::invalid_parameter(format!(
                    "route {} is {}, not FORWARD",
                    prefix, data.action
                )));
            }

            let family = prefix.family();
            if !router.attrs.admin_state(family).is_up() {
                return Err(RouterError::not_found(format!(
                    "usable next hop for {} in {}: {} routing is down",
                    prefix, vrid, family
                )));
            }
            let members: Vec<NextHop> = data
                .next_hops
                .iter()
                .filter(|nh| {
                    intfs
                        .admin_state(nh.rif)
                        .map(|state| state.unicast(family).is_up())
                        .unwrap_or(false)
                })
                .copied()
                .collect();

            select_index(&router.ecmp, flow, members.len())
                .map(|index| members[index])
                .ok_or_else(|| {
                    RouterError::not_found(format!("usable next hop for {} in {}", prefix, vrid))
                })
        })
    }

    /// Adds, deletes or clears multicast routes from a raw command.
    pub fn mc_route_set(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        key: Option<&McRouteKey>,
        data: Option<&McRouteData>,
        ext: Option<&VendorExt>,
    ) -> RouterResult<()> {
        self.vendor_ext("mc_route_set", ext);
        self.mc_route_apply(vrid, McRouteOp::from_cmd(cmd, key, data)?)
    }

    pub fn mc_route_apply(&self, vrid: VrId, op: McRouteOp) -> RouterResult<()> {
        self.with_router(vrid, |router| {
            let mut intfs = write(&router.tables.intfs, INTFS)?;
            let mut mcast = write(&router.tables.mcast, MCAST)?;
            if matches!(op, McRouteOp::Add(..)) {
                router.require_multicast()?;
            }
            match op {
                McRouteOp::Add(key, data) => {
                    mcast.add_route(&mut intfs, key, data.clone())?;
                    self.notify(|cb| cb.on_mc_route_added(vrid, &key, &data));
                }
                McRouteOp::Delete(key) => {
                    mcast.remove_route(&mut intfs, &key)?;
                    self.notify(|cb| cb.on_mc_route_removed(vrid, &key));
                }
                McRouteOp::DeleteAll => {
                    for key in mcast.remove_all(&mut intfs) {
                        self.notify(|cb| cb.on_mc_route_removed(vrid, &key));
                    }
                }
            }
            Ok(())
        })
    }

    /// Reads multicast routes with GET, GET_FIRST or GET_NEXT.
    pub fn mc_route_get(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        key: Option<McRouteKey>,
        count: usize,
        ext: Option<&VendorExt>,
    ) -> RouterResult<Vec<McRouteEntry>> {
        self.vendor_ext("mc_route_get", ext);
        self.mc_route_query(vrid, &Query::from_cmd(cmd, key, count)?)
    }

    pub fn mc_route_query(&self, vrid: VrId, query: &Query<McRouteKey>) -> RouterResult<Vec<McRouteEntry>> {
        self.with_router(vrid, |router| read(&router.tables.mcast, MCAST)?.query(query))
    }

    /// Adds (ADD) or removes (DELETE) egress interfaces of a multicast
    /// route. The route action is not changed.
    pub fn mc_egress_rif_set(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        key: &McRouteKey,
        rifs: &[RifId],
        ext: Option<&VendorExt>,
    ) -> RouterResult<()> {
        self.vendor_ext("mc_egress_rif_set", ext);
        let op = EgressOp::from_cmd(cmd, rifs)?;
        self.with_router(vrid, |router| {
            if matches!(op, EgressOp::Add(_)) {
                router.require_multicast()?;
            }
            let mut intfs = write(&router.tables.intfs, INTFS)?;
            let mut mcast = write(&router.tables.mcast, MCAST)?;
            mcast.apply_egress_op(&mut intfs, key, op)?;
            if let Some(data) = mcast.get_route(key) {
                self.notify(|cb| cb.on_mc_egress_changed(vrid, key, &data.egress_rifs));
            }
            Ok(())
        })
    }

    /// Copies up to `capacity` egress interfaces of a multicast route; a
    /// capacity of 0 only counts them.
    pub fn mc_egress_rif_get(
        &self,
        vrid: VrId,
        key: &McRouteKey,
        capacity: usize,
        ext: Option<&VendorExt>,
    ) -> RouterResult<BufferFill<RifId>> {
        self.vendor_ext("mc_egress_rif_get", ext);
        self.with_router(vrid, |router| {
            read(&router.tables.mcast, MCAST)?.egress_list(key, capacity)
        })
    }
}
