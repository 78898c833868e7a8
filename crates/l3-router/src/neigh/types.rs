//! Neighbor types.

use crate::types::ForwardAction;
use l3_sdk::{AccessCmd, RifId, RouterError, RouterResult};
use l3_types::{IpAddress, MacAddress};
use serde::{Deserialize, Serialize};

/// Data of one neighbor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborData {
    pub rif: RifId,
    pub mac: MacAddress,
    pub action: ForwardAction,
    /// Set when traffic hit the neighbor since the activity was last read.
    #[serde(default)]
    pub activity: bool,
}

impl NeighborData {
    pub fn new(rif: RifId, mac: MacAddress, action: ForwardAction) -> Self {
        Self {
            rif,
            mac,
            action,
            activity: false,
        }
    }

    /// Checks the key and data of a neighbor against each other.
    pub fn validate(&self, ip: &IpAddress) -> RouterResult<()> {
        if ip.is_multicast() || ip.is_unspecified() {
            return Err(RouterError::invalid_parameter(format!(
                "{} is not a unicast neighbor address",
                ip
            )));
        }
        if !self.rif.is_valid() {
            return Err(RouterError::missing_parameter("rif"));
        }
        if self.mac.is_multicast() {
            return Err(RouterError::invalid_parameter(format!(
                "neighbor MAC {} is a group address",
                self.mac
            )));
        }
        if self.action.is_forward() && self.mac.is_zero() {
            return Err(RouterError::invalid_parameter(format!(
                "forwarding neighbor {} needs a MAC",
                ip
            )));
        }
        Ok(())
    }
}

/// A neighbor as returned by a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborEntry {
    pub ip: IpAddress,
    pub data: NeighborData,
}

/// Result of a neighbor read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborReply {
    /// GET, GET_FIRST and GET_NEXT.
    Entries(Vec<NeighborEntry>),
    /// GET_ACTIVITY: the flag as it was before the read cleared it.
    Activity { ip: IpAddress, active: bool },
}

impl NeighborReply {
    /// Returns the entries, or an empty slice for an activity reply.
    pub fn entries(&self) -> &[NeighborEntry] {
        match self {
            NeighborReply::Entries(entries) => entries,
            NeighborReply::Activity { .. } => &[],
        }
    }
}

/// A neighbor table mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborOp {
    Add(IpAddress, NeighborData),
    Edit(IpAddress, NeighborData),
    /// Deletes by address; the rif is not consulted.
    Delete(IpAddress),
    /// Deletes the neighbors of one rif, or of the whole router if `None`.
    DeleteAll { rif: Option<RifId> },
}

impl NeighborOp {
    /// Builds an operation from a raw command.
    ///
    /// For DELETE_ALL the scope comes from the rif of `data`; an absent
    /// data block or an invalid rif selects every neighbor of the router.
    pub fn from_cmd(
        cmd: AccessCmd,
        key: Option<IpAddress>,
        data: Option<&NeighborData>,
    ) -> RouterResult<Self> {
        let need_key = || key.ok_or_else(|| RouterError::missing_parameter("neighbor key"));
        let need_data = || {
            data.cloned()
                .ok_or_else(|| RouterError::missing_parameter("neighbor data"))
        };
        match cmd {
            AccessCmd::Add => Ok(NeighborOp::Add(need_key()?, need_data()?)),
            AccessCmd::Edit => Ok(NeighborOp::Edit(need_key()?, need_data()?)),
            AccessCmd::Delete => Ok(NeighborOp::Delete(need_key()?)),
            AccessCmd::DeleteAll => Ok(NeighborOp::DeleteAll {
                rif: data.and_then(|d| d.rif.valid()),
            }),
            other => Err(RouterError::cmd_unsupported(other, "neigh_set")),
        }
    }
}
