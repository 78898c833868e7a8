//! Capacity shared by every virtual router.
//!
//! The emulated ASIC has one table of each kind, so limits apply across all
//! routers. Router interface IDs are also global.

use crate::config::RouterConfig;
use l3_orch_common::{IdPool, ResourceGauge};
use l3_sdk::{RifId, RouterError, RouterResult};
use std::sync::Mutex;

/// Global resource pools, shared by all per-router tables.
#[derive(Debug)]
pub struct RouterResources {
    rif_ids: Mutex<IdPool>,
    pub(crate) neighbors: ResourceGauge,
    pub(crate) uc_routes: ResourceGauge,
    pub(crate) mc_routes: ResourceGauge,
    pub(crate) counters: ResourceGauge,
    pub(crate) max_ecmp_paths: usize,
    pub(crate) max_macs_per_rif: usize,
    pub(crate) max_mc_egress: usize,
}

impl RouterResources {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            rif_ids: Mutex::new(IdPool::new(config.max_rifs)),
            neighbors: ResourceGauge::new("neighbors", config.max_neighbors),
            uc_routes: ResourceGauge::new("uc_routes", config.max_uc_routes),
            mc_routes: ResourceGauge::new("mc_routes", config.max_mc_routes),
            counters: ResourceGauge::new("counters", config.max_counters),
            max_ecmp_paths: usize::from(config.max_ecmp_paths),
            max_macs_per_rif: usize::from(config.max_macs_per_rif),
            max_mc_egress: usize::from(config.max_mc_egress),
        }
    }

    /// Takes the lowest free rif ID.
    pub(crate) fn allocate_rif(&self) -> RouterResult<RifId> {
        let mut pool = self
            .rif_ids
            .lock()
            .map_err(|_| RouterError::internal("rif id pool lock poisoned"))?;
        pool.allocate()
            .map(RifId::new)
            .ok_or_else(|| RouterError::no_resources("router interfaces"))
    }

    pub(crate) fn release_rif(&self, rif: RifId) {
        match self.rif_ids.lock() {
            Ok(mut pool) => {
                if !pool.release(rif.as_raw()) {
                    log::warn!("Released {} that was not allocated", rif);
                }
            }
            Err(_) => log::error!("rif id pool lock poisoned, {} leaked", rif),
        }
    }

    /// Returns the number of router interfaces in use across all routers.
    pub fn rifs_in_use(&self) -> usize {
        self.rif_ids.lock().map(|pool| pool.used()).unwrap_or(0)
    }
}

/// Takes `n` slots of `gauge` or fails with `NoResources`.
pub(crate) fn acquire(gauge: &ResourceGauge, n: u32) -> RouterResult<()> {
    if gauge.try_acquire(n) {
        Ok(())
    } else {
        Err(RouterError::no_resources(gauge.name()))
    }
}
