//! Neighbor (ARP/ND) table.
//!
//! Maps an IP address of a virtual router to the interface and MAC it was
//! learned on. Reads follow the four-mode protocol: GET and GET_ACTIVITY look
//! up one address, GET_FIRST and GET_NEXT page through the table in address
//! order (IPv4 before IPv6). Reading the activity flag clears it, so a
//! periodic GET_ACTIVITY scan finds neighbors that saw no traffic since the
//! previous scan.

mod orch;
mod types;

pub use orch::{NeighOrch, NeighOrchStats};
pub use types::{NeighborData, NeighborEntry, NeighborOp, NeighborReply};
