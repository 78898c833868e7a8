//! Multicast FIB.
//!
//! Routes are keyed by (group, source, ingress rif); an unspecified source
//! is a (*,G) route. The egress interface list can be grown and shrunk
//! incrementally without rewriting the route, and an egress read with a
//! buffer capacity of 0 only reports how many egress interfaces there are.

mod orch;
mod types;

pub use orch::{McastOrch, McastOrchStats};
pub use types::{EgressOp, McRouteData, McRouteEntry, McRouteKey, McRouteOp};
