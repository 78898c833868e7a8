//! Virtual routers.
//!
//! Each virtual router owns its interface, neighbor, unicast and multicast
//! tables, each behind its own lock. [`VrfOrch`] is the registry: it
//! allocates vrids and refuses to delete a router whose tables still hold
//! entries.

mod orch;
mod types;

pub use orch::{VirtualRouter, VrfOrch, VrfOrchStats, VrfTables};
pub use types::{RouterAttributes, RouterOp};
