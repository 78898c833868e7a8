//! Unicast FIB.
//!
//! Routes are keyed by canonical prefix and hold an action plus an ordered
//! next-hop list. SET replaces the whole list in one step and creates the
//! route if it is missing. A route whose neighbor is not resolved yet is
//! installed with TRAP; once the neighbor is programmed the caller SETs it to
//! FORWARD. Lookup is longest-prefix match.

mod nexthop;
mod orch;
mod types;

pub use nexthop::NextHop;
pub use orch::{RouteOrch, RouteOrchStats};
pub use types::{UcRouteData, UcRouteEntry, UcRouteOp};
