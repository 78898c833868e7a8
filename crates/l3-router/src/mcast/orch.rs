//! McastOrch implementation.
//!
//! Manages the multicast FIB of one virtual router. A route holds one
//! reference on its ingress interface and one on every egress interface.

use log::{debug, info};
use l3_orch_common::{BufferFill, SyncMap};
use l3_sdk::{Query, RifId, RouterError, RouterResult, VrId};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::types::{check_egress, EgressOp, McRouteData, McRouteEntry, McRouteKey};
use crate::intfs::IntfsOrch;
use crate::resources::{acquire, RouterResources};
use crate::table::run_query;

/// Statistics for McastOrch operations.
#[derive(Debug, Clone, Default)]
pub struct McastOrchStats {
    pub routes_added: u64,
    pub routes_removed: u64,
    pub egress_added: u64,
    pub egress_removed: u64,
}

/// McastOrch - multicast FIB of one virtual router.
#[derive(Debug)]
pub struct McastOrch {
    vrid: VrId,
    resources: Arc<RouterResources>,
    stats: McastOrchStats,
    routes: SyncMap<McRouteKey, McRouteData>,
}

fn route_rifs(key: &McRouteKey, data: &McRouteData) -> Vec<RifId> {
    std::iter::once(key.ingress_rif)
        .chain(data.egress_rifs.iter().copied())
        .collect()
}

impl McastOrch {
    pub fn new(vrid: VrId, resources: Arc<RouterResources>) -> Self {
        Self {
            vrid,
            resources,
            stats: McastOrchStats::default(),
            routes: SyncMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn stats(&self) -> &McastOrchStats {
        &self.stats
    }

    pub fn get_route(&self, key: &McRouteKey) -> Option<&McRouteData> {
        self.routes.get(key)
    }

    fn not_found(&self, key: &McRouteKey) -> RouterError {
        RouterError::not_found(format!("multicast route {} in {}", key, self.vrid))
    }

    pub fn add_route(
        &mut self,
        intfs: &mut IntfsOrch,
        key: McRouteKey,
        data: McRouteData,
    ) -> RouterResult<()> {
        key.validate()?;
        data.validate(&key, self.resources.max_mc_egress)?;
        if self.routes.contains_key(&key) {
            return Err(RouterError::already_exists(format!(
                "multicast route {} in {}",
                key, self.vrid
            )));
        }

        let rifs = route_rifs(&key, &data);
        intfs.acquire_refs(&rifs)?;
        if let Err(e) = acquire(&self.resources.mc_routes, 1) {
            intfs.release_refs(&rifs);
            return Err(e);
        }

        debug!(
            "Added multicast route {} in {}: {} to {} interfaces",
            key,
            self.vrid,
            data.action,
            data.egress_rifs.len()
        );
        self.routes.insert(key, data);
        self.stats.routes_added += 1;
        Ok(())
    }

    pub fn remove_route(
        &mut self,
        intfs: &mut IntfsOrch,
        key: &McRouteKey,
    ) -> RouterResult<McRouteData> {
        let data = self.routes.remove(key).ok_or_else(|| self.not_found(key))?;

        intfs.release_refs(&route_rifs(key, &data));
        self.resources.mc_routes.release(1);
        self.stats.routes_removed += 1;

        debug!("Removed multicast route {} from {}", key, self.vrid);
        Ok(data)
    }

    /// Removes every multicast route of the router and returns their keys.
    pub fn remove_all(&mut self, intfs: &mut IntfsOrch) -> Vec<McRouteKey> {
        let removed: Vec<McRouteKey> = self.routes.keys().copied().collect();
        for (key, data) in self.routes.iter() {
            intfs.release_refs(&route_rifs(key, data));
        }
        self.routes.clear();
        self.resources.mc_routes.release(removed.len() as u32);
        self.stats.routes_removed += removed.len() as u64;

        info!(
            "Removed all {} multicast routes from {}",
            removed.len(),
            self.vrid
        );
        removed
    }

    /// Runs GET, GET_FIRST or GET_NEXT. GET_ACTIVITY is unsupported.
    pub fn query(&self, query: &Query<McRouteKey>) -> RouterResult<Vec<McRouteEntry>> {
        Ok(run_query(&self.routes, query, "mc_route_get")?
            .into_iter()
            .map(|(key, data)| McRouteEntry { key, data })
            .collect())
    }

    /// Adds or removes egress interfaces without touching the action.
    ///
    /// Either every listed interface is applied or none is.
    pub fn apply_egress_op(
        &mut self,
        intfs: &mut IntfsOrch,
        key: &McRouteKey,
        op: EgressOp,
    ) -> RouterResult<()> {
        let max_egress = self.resources.max_mc_egress;
        let vrid = self.vrid;
        let data = match self.routes.get_mut(key) {
            Some(data) => data,
            None => {
                return Err(RouterError::not_found(format!(
                    "multicast route {} in {}",
                    key, vrid
                )))
            }
        };

        let (added, removed) = match op {
            EgressOp::Add(rifs) => {
                check_egress(key, &data.egress_rifs, &rifs, max_egress)?;
                intfs.acquire_refs(&rifs)?;
                data.egress_rifs.extend(rifs.iter().copied());
                (rifs.len(), 0)
            }
            EgressOp::Delete(rifs) => {
                let mut seen = BTreeSet::new();
                for rif in &rifs {
                    if !seen.insert(*rif) {
                        return Err(RouterError::invalid_parameter(format!(
                            "{} listed twice",
                            rif
                        )));
                    }
                    if !data.egress_rifs.contains(rif) {
                        return Err(RouterError::not_found(format!(
                            "{} egress of {}",
                            rif, key
                        )));
                    }
                }
                data.egress_rifs.retain(|rif| !seen.contains(rif));
                intfs.release_refs(&rifs);
                (0, rifs.len())
            }
        };

        debug!(
            "Multicast route {} in {}: +{} -{} egress interfaces, {} now",
            key,
            vrid,
            added,
            removed,
            data.egress_rifs.len()
        );
        self.stats.egress_added += added as u64;
        self.stats.egress_removed += removed as u64;
        Ok(())
    }

    /// Copies up to `capacity` egress interfaces; 0 only counts them.
    pub fn egress_list(&self, key: &McRouteKey, capacity: usize) -> RouterResult<BufferFill<RifId>> {
        let data = self.routes.get(key).ok_or_else(|| self.not_found(key))?;
        Ok(BufferFill::fill(&data.egress_rifs, capacity))
    }
}
