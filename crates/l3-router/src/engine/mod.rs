//! The router API.
//!
//! [`L3Router`] is the entry point for callers. It owns the router registry
//! and the global resource pools, converts raw access commands into typed
//! requests, takes the locks in a fixed order and forwards vendor
//! extensions and table events to the registered [`RouterCallbacks`].
//!
//! Locking: the registry lock is taken exclusively only to add, edit or
//! delete a router and to change its ECMP parameters. Every other call
//! holds it shared for its whole duration and then locks the tables it
//! touches in the order interfaces, neighbors, unicast routes, multicast
//! routes.

mod interface;
mod neighbor;
mod route;

use log::info;
use l3_sdk::{AccessCmd, RouterResult, VendorExt, VrId};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::callbacks::RouterCallbacks;
use crate::config::{ConfigError, RouterConfig};
use crate::ecmp::EcmpHashParams;
use crate::resources::RouterResources;
use crate::table::{read, write};
use crate::types::TableOccupancy;
use crate::vrf::{RouterAttributes, RouterOp, VirtualRouter, VrfOrch};

/// The L3 router control plane.
///
/// `L3Router` is `Send + Sync`; share it between threads with an `Arc`.
pub struct L3Router {
    config: RouterConfig,
    resources: Arc<RouterResources>,
    registry: RwLock<VrfOrch>,
    callbacks: Option<Arc<dyn RouterCallbacks>>,
}

impl std::fmt::Debug for L3Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L3Router")
            .field("config", &self.config)
            .field("resources", &self.resources)
            .field("callbacks", &self.callbacks.is_some())
            .finish_non_exhaustive()
    }
}

impl L3Router {
    /// Creates an empty router control plane after validating `config`.
    pub fn new(config: RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resources = Arc::new(RouterResources::new(&config));
        let registry = VrfOrch::new(
            config.max_routers,
            Arc::clone(&resources),
            config.default_ecmp.clone(),
        );
        info!(
            "L3 router up: {} routers, {} rifs, {} neighbors, {} unicast routes, {} multicast routes",
            config.max_routers,
            config.max_rifs,
            config.max_neighbors,
            config.max_uc_routes,
            config.max_mc_routes
        );
        Ok(Self {
            config,
            resources,
            registry: RwLock::new(registry),
            callbacks: None,
        })
    }

    /// Registers the hooks that receive vendor extensions and table events.
    pub fn set_callbacks(&mut self, callbacks: Arc<dyn RouterCallbacks>) {
        self.callbacks = Some(callbacks);
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the global resource pools.
    pub fn resources(&self) -> &RouterResources {
        &self.resources
    }

    fn vendor_ext(&self, operation: &str, ext: Option<&VendorExt>) {
        if let (Some(callbacks), Some(ext)) = (&self.callbacks, ext) {
            callbacks.on_vendor_ext(operation, ext);
        }
    }

    fn notify(&self, event: impl FnOnce(&dyn RouterCallbacks)) {
        if let Some(callbacks) = &self.callbacks {
            event(callbacks.as_ref());
        }
    }

    fn registry(&self) -> RouterResult<RwLockReadGuard<'_, VrfOrch>> {
        read(&self.registry, "router registry")
    }

    fn registry_mut(&self) -> RouterResult<RwLockWriteGuard<'_, VrfOrch>> {
        write(&self.registry, "router registry")
    }

    /// Runs `f` on one router with the registry held shared.
    fn with_router<T>(
        &self,
        vrid: VrId,
        f: impl FnOnce(&VirtualRouter) -> RouterResult<T>,
    ) -> RouterResult<T> {
        let registry = self.registry()?;
        f(registry.get(vrid)?)
    }

    /// Creates, modifies or deletes a virtual router from a raw command.
    ///
    /// Returns the vrid the command applied to: the allocated one for ADD.
    pub fn router_set(
        &self,
        cmd: AccessCmd,
        vrid: Option<VrId>,
        attrs: Option<&RouterAttributes>,
        ext: Option<&VendorExt>,
    ) -> RouterResult<VrId> {
        self.vendor_ext("router_set", ext);
        self.router_apply(RouterOp::from_cmd(cmd, vrid, attrs)?)
    }

    pub fn router_apply(&self, op: RouterOp) -> RouterResult<VrId> {
        let mut registry = self.registry_mut()?;
        match op {
            RouterOp::Add(attrs) => {
                let vrid = registry.add_router(attrs)?;
                self.notify(|cb| cb.on_router_added(vrid));
                Ok(vrid)
            }
            RouterOp::Edit(vrid, attrs) => {
                registry.edit_router(vrid, attrs)?;
                Ok(vrid)
            }
            RouterOp::Delete(vrid) => {
                registry.remove_router(vrid)?;
                self.notify(|cb| cb.on_router_removed(vrid));
                Ok(vrid)
            }
        }
    }

    pub fn router_get(&self, vrid: VrId, ext: Option<&VendorExt>) -> RouterResult<RouterAttributes> {
        self.vendor_ext("router_get", ext);
        self.with_router(vrid, |router| Ok(router.attrs))
    }

    /// Returns every vrid in ascending order.
    pub fn router_list(&self) -> RouterResult<Vec<VrId>> {
        Ok(self.registry()?.router_ids())
    }

    pub fn ecmp_hash_params_set(
        &self,
        vrid: VrId,
        params: &EcmpHashParams,
        ext: Option<&VendorExt>,
    ) -> RouterResult<()> {
        self.vendor_ext("ecmp_hash_params_set", ext);
        self.registry_mut()?.set_ecmp(vrid, params.clone())
    }

    pub fn ecmp_hash_params_get(
        &self,
        vrid: VrId,
        ext: Option<&VendorExt>,
    ) -> RouterResult<EcmpHashParams> {
        self.vendor_ext("ecmp_hash_params_get", ext);
        self.with_router(vrid, |router| Ok(router.ecmp.clone()))
    }

    /// Returns how many entries each table of a router holds.
    pub fn table_occupancy(&self, vrid: VrId) -> RouterResult<TableOccupancy> {
        self.with_router(vrid, |router| router.tables.occupancy())
    }
}
