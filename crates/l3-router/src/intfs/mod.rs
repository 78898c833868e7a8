//! Router interfaces.
//!
//! A router interface (rif) attaches a virtual router to one L2 construct,
//! a VLAN or a port. Rif IDs are unique across all routers. Neighbors,
//! routes and multicast routes reference rifs by ID and hold a reference
//! count on them; a rif with references or an allocated counter cannot be
//! deleted.

mod orch;
mod types;

pub use orch::{IntfsOrch, IntfsOrchStats};
pub use types::{
    InterfaceOp, MacListOp, QosTrust, RifAdminState, RifAttributes, RifBinding, RouterInterface,
    MAX_MTU, MIN_MTU,
};
