//! Notification hooks for a platform layer.
//!
//! A [`RouterCallbacks`] implementation sees every vendor extension passed
//! to the API and is told about objects as they are created and removed.
//! Hooks run synchronously on the calling thread while the affected table
//! is still locked, so they must not call back into the router.

use crate::intfs::RifBinding;
use crate::mcast::{McRouteData, McRouteKey};
use crate::neigh::NeighborData;
use crate::route::UcRouteData;
use l3_sdk::{RifId, VendorExt, VrId};
use l3_types::{IpAddress, IpPrefix};

/// Hooks invoked by [`crate::L3Router`]. Every method defaults to a no-op.
pub trait RouterCallbacks: Send + Sync {
    /// Called with the vendor extension of any call that supplied one,
    /// before the call is validated.
    fn on_vendor_ext(&self, _operation: &str, _ext: &VendorExt) {}

    fn on_router_added(&self, _vrid: VrId) {}

    fn on_router_removed(&self, _vrid: VrId) {}

    fn on_rif_added(&self, _vrid: VrId, _rif: RifId, _binding: &RifBinding) {}

    fn on_rif_removed(&self, _vrid: VrId, _rif: RifId) {}

    fn on_neighbor_added(&self, _vrid: VrId, _ip: &IpAddress, _data: &NeighborData) {}

    fn on_neighbor_removed(&self, _vrid: VrId, _ip: &IpAddress) {}

    /// Called when a unicast route is created or its data replaced.
    fn on_uc_route_set(&self, _vrid: VrId, _prefix: &IpPrefix, _data: &UcRouteData) {}

    fn on_uc_route_removed(&self, _vrid: VrId, _prefix: &IpPrefix) {}

    fn on_mc_route_added(&self, _vrid: VrId, _key: &McRouteKey, _data: &McRouteData) {}

    fn on_mc_route_removed(&self, _vrid: VrId, _key: &McRouteKey) {}

    /// Called with the full egress list after interfaces were added to or
    /// removed from a multicast route.
    fn on_mc_egress_changed(&self, _vrid: VrId, _key: &McRouteKey, _egress_rifs: &[RifId]) {}
}
