//! ECMP hashing.
//!
//! Each virtual router carries one set of [`EcmpHashParams`]. When a route
//! has more than one next hop, a flow is hashed over the configured header
//! fields only and the hash picks the member. The same flow always picks the
//! same member while the next-hop list is unchanged, and with `symmetric`
//! set both directions of a conversation pick the same member.

mod hash;
mod types;

pub use hash::{flow_hash, select_index};
pub use types::{EcmpHashField, EcmpHashParams, EcmpHashType, FlowKey};
