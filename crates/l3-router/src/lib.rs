//! L3 Router - software router control plane
//!
//! This crate models the routing tables of a switch ASIC behind an
//! SDK-style API: virtual routers, router interfaces, the neighbor table,
//! the unicast and multicast FIBs, ECMP hashing and per-interface counters.
//!
//! # Architecture
//!
//! ```text
//! caller ──> [L3Router] ──> [VrfOrch registry]
//!                                 │
//!                     per virtual router (VrfTables)
//!             ┌──────────┬────────┴───────┬───────────┐
//!         [IntfsOrch] [NeighOrch]   [RouteOrch]  [McastOrch]
//!             ↑           │              │            │
//!             └───────────┴── rif refs ──┴────────────┘
//! ```
//!
//! # Key Components
//!
//! - [`L3Router`]: the call surface; converts raw access commands into
//!   typed operations and owns the locks
//! - [`vrf`]: the router registry and per-router tables
//! - [`intfs`], [`neigh`], [`route`], [`mcast`]: one orch per table
//! - [`ecmp`]: flow hashing and next-hop selection
//! - [`counter`]: lock-free interface counters
//! - [`config`]: table capacities, loadable from JSON
//!
//! # Example
//!
//! ```
//! use l3_router::{L3Router, RouterConfig, RouterAttributes, RifAttributes, RifBinding};
//! use l3_sdk::AccessCmd;
//! use l3_types::VlanId;
//!
//! let router = L3Router::new(RouterConfig::default()).unwrap();
//! let vrid = router
//!     .router_set(AccessCmd::Add, None, Some(&RouterAttributes::default()), None)
//!     .unwrap();
//! let rif = router
//!     .interface_set(
//!         AccessCmd::Add,
//!         vrid,
//!         None,
//!         Some(RifBinding::Vlan(VlanId::new(10).unwrap())),
//!         Some(&RifAttributes::new("00:11:22:33:44:55".parse().unwrap(), 1500)),
//!         None,
//!     )
//!     .unwrap();
//! assert!(rif.is_some());
//! ```

pub mod callbacks;
pub mod config;
pub mod counter;
pub mod ecmp;
mod engine;
pub mod intfs;
pub mod mcast;
pub mod neigh;
pub mod resources;
pub mod route;
mod table;
pub mod types;
pub mod vrf;

pub use callbacks::RouterCallbacks;
pub use config::{ConfigError, RouterConfig};
pub use counter::{CounterDirection, DirectionStats, RifCounterSnapshot};
pub use ecmp::{EcmpHashField, EcmpHashParams, EcmpHashType, FlowKey};
pub use engine::L3Router;
pub use intfs::{RifAdminState, RifAttributes, RifBinding, RouterInterface};
pub use mcast::{McRouteData, McRouteEntry, McRouteKey};
pub use neigh::{NeighborData, NeighborEntry, NeighborReply};
pub use resources::RouterResources;
pub use route::{NextHop, UcRouteData, UcRouteEntry};
pub use types::{ForwardAction, TableOccupancy};
pub use vrf::{RouterAttributes, VirtualRouter};
