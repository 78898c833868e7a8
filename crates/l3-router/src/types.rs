//! Types shared by the router tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Forwarding action of a neighbor or route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardAction {
    /// Send to the control plane.
    Trap,
    Drop,
    Forward,
}

impl ForwardAction {
    pub fn is_forward(&self) -> bool {
        *self == ForwardAction::Forward
    }
}

impl fmt::Display for ForwardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardAction::Trap => write!(f, "TRAP"),
            ForwardAction::Drop => write!(f, "DROP"),
            ForwardAction::Forward => write!(f, "FORWARD"),
        }
    }
}

/// Entries currently held by one virtual router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableOccupancy {
    pub interfaces: usize,
    pub neighbors: usize,
    pub uc_routes: usize,
    pub mc_routes: usize,
}

impl TableOccupancy {
    pub fn is_empty(&self) -> bool {
        *self == TableOccupancy::default()
    }
}
