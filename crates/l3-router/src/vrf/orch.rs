//! VrfOrch implementation.

use log::{debug, info};
use l3_orch_common::{IdPool, SyncMap};
use l3_sdk::{RouterError, RouterResult, VrId};
use std::sync::{Arc, RwLock};

use super::types::RouterAttributes;
use crate::ecmp::EcmpHashParams;
use crate::intfs::IntfsOrch;
use crate::mcast::McastOrch;
use crate::neigh::NeighOrch;
use crate::resources::RouterResources;
use crate::route::RouteOrch;
use crate::table::read;
use crate::types::TableOccupancy;

/// The tables of one virtual router.
///
/// Callers that need more than one lock take them in field order.
#[derive(Debug)]
pub struct VrfTables {
    pub intfs: RwLock<IntfsOrch>,
    pub neigh: RwLock<NeighOrch>,
    pub routes: RwLock<RouteOrch>,
    pub mcast: RwLock<McastOrch>,
}

impl VrfTables {
    pub fn new(vrid: VrId, resources: &Arc<RouterResources>) -> Self {
        Self {
            intfs: RwLock::new(IntfsOrch::new(vrid, Arc::clone(resources))),
            neigh: RwLock::new(NeighOrch::new(vrid, Arc::clone(resources))),
            routes: RwLock::new(RouteOrch::new(vrid, Arc::clone(resources))),
            mcast: RwLock::new(McastOrch::new(vrid, Arc::clone(resources))),
        }
    }

    pub fn occupancy(&self) -> RouterResult<TableOccupancy> {
        let intfs = read(&self.intfs, "interface table")?;
        let neigh = read(&self.neigh, "neighbor table")?;
        let routes = read(&self.routes, "unicast route table")?;
        let mcast = read(&self.mcast, "multicast route table")?;
        Ok(TableOccupancy {
            interfaces: intfs.len(),
            neighbors: neigh.len(),
            uc_routes: routes.len(),
            mc_routes: mcast.len(),
        })
    }
}

/// A virtual router and everything programmed into it.
#[derive(Debug)]
pub struct VirtualRouter {
    pub vrid: VrId,
    pub attrs: RouterAttributes,
    pub ecmp: EcmpHashParams,
    pub tables: VrfTables,
}

impl VirtualRouter {
    /// Fails unless unicast routes may be added to this router.
    pub fn require_unicast(&self) -> RouterResult<()> {
        if self.attrs.uc_enabled {
            Ok(())
        } else {
            Err(RouterError::invalid_parameter(format!(
                "unicast routing is disabled on {}",
                self.vrid
            )))
        }
    }

    /// Fails unless multicast routes or egress interfaces may be added.
    pub fn require_multicast(&self) -> RouterResult<()> {
        if self.attrs.mc_enabled {
            Ok(())
        } else {
            Err(RouterError::invalid_parameter(format!(
                "multicast routing is disabled on {}",
                self.vrid
            )))
        }
    }
}

/// Statistics for VrfOrch operations.
#[derive(Debug, Clone, Default)]
pub struct VrfOrchStats {
    pub routers_created: u64,
    pub routers_removed: u64,
    pub routers_updated: u64,
}

/// VrfOrch - registry of virtual routers.
#[derive(Debug)]
pub struct VrfOrch {
    resources: Arc<RouterResources>,
    default_ecmp: EcmpHashParams,
    ids: IdPool,
    routers: SyncMap<VrId, VirtualRouter>,
    stats: VrfOrchStats,
}

impl VrfOrch {
    pub fn new(max_routers: u32, resources: Arc<RouterResources>, default_ecmp: EcmpHashParams) -> Self {
        Self {
            resources,
            default_ecmp,
            ids: IdPool::new(max_routers),
            routers: SyncMap::new(),
            stats: VrfOrchStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    pub fn stats(&self) -> &VrfOrchStats {
        &self.stats
    }

    pub fn contains(&self, vrid: VrId) -> bool {
        self.routers.contains_key(&vrid)
    }

    pub fn router_ids(&self) -> Vec<VrId> {
        self.routers.keys().copied().collect()
    }

    pub fn get(&self, vrid: VrId) -> RouterResult<&VirtualRouter> {
        self.routers
            .get(&vrid)
            .ok_or_else(|| RouterError::not_found(vrid.to_string()))
    }

    fn get_mut(&mut self, vrid: VrId) -> RouterResult<&mut VirtualRouter> {
        self.routers
            .get_mut(&vrid)
            .ok_or_else(|| RouterError::not_found(vrid.to_string()))
    }

    /// Creates a router with the lowest free vrid.
    pub fn add_router(&mut self, attrs: RouterAttributes) -> RouterResult<VrId> {
        attrs.validate()?;
        let vrid = self
            .ids
            .allocate()
            .map(VrId::new)
            .ok_or_else(|| RouterError::no_resources("virtual routers"))?;

        self.routers.insert(
            vrid,
            VirtualRouter {
                vrid,
                attrs,
                ecmp: self.default_ecmp.clone(),
                tables: VrfTables::new(vrid, &self.resources),
            },
        );
        self.stats.routers_created += 1;
        info!(
            "Created {} (v4 {}, v6 {}, miss {})",
            vrid, attrs.ipv4_state, attrs.ipv6_state, attrs.miss_action
        );
        Ok(vrid)
    }

    pub fn edit_router(&mut self, vrid: VrId, attrs: RouterAttributes) -> RouterResult<()> {
        attrs.validate()?;
        let router = self.get_mut(vrid)?;
        router.attrs = attrs;
        self.stats.routers_updated += 1;
        debug!("Updated {}", vrid);
        Ok(())
    }

    /// Deletes a router; fails with `ResourceInUse` while any of its tables
    /// hold entries.
    pub fn remove_router(&mut self, vrid: VrId) -> RouterResult<()> {
        let occupancy = self.get(vrid)?.tables.occupancy()?;
        if !occupancy.is_empty() {
            return Err(RouterError::in_use(format!(
                "{} ({} interfaces, {} neighbors, {} unicast routes, {} multicast routes)",
                vrid,
                occupancy.interfaces,
                occupancy.neighbors,
                occupancy.uc_routes,
                occupancy.mc_routes
            )));
        }

        self.routers.remove(&vrid);
        if !self.ids.release(vrid.as_raw()) {
            log::warn!("Released {} that was not allocated", vrid);
        }
        self.stats.routers_removed += 1;
        info!("Removed {}", vrid);
        Ok(())
    }

    pub fn set_ecmp(&mut self, vrid: VrId, params: EcmpHashParams) -> RouterResult<()> {
        params.validate()?;
        let router = self.get_mut(vrid)?;
        debug!(
            "{} ECMP hash: {:?} over {} fields, seed {}, symmetric {}",
            vrid,
            params.hash_type,
            params.fields.len(),
            params.seed,
            params.symmetric
        );
        router.ecmp = params;
        Ok(())
    }
}
