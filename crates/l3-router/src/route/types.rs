//! Unicast route types.

use super::nexthop::NextHop;
use crate::types::ForwardAction;
use l3_sdk::{AccessCmd, RifId, RouterError, RouterResult};
use l3_types::IpPrefix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Action and next hops of a unicast route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UcRouteData {
    pub action: ForwardAction,
    /// ECMP members in caller order.
    pub next_hops: Vec<NextHop>,
}

impl UcRouteData {
    pub fn new(action: ForwardAction, next_hops: Vec<NextHop>) -> Self {
        Self { action, next_hops }
    }

    pub fn forward(next_hops: Vec<NextHop>) -> Self {
        Self::new(ForwardAction::Forward, next_hops)
    }

    /// Rifs referenced by the next hops, one per next hop.
    pub fn rifs(&self) -> Vec<RifId> {
        self.next_hops.iter().map(|nh| nh.rif).collect()
    }

    /// Checks a route before it touches the table.
    pub fn validate(&self, prefix: &IpPrefix, max_ecmp_paths: usize) -> RouterResult<()> {
        if !prefix.is_canonical() {
            return Err(RouterError::invalid_parameter(format!(
                "prefix {} has host bits set",
                prefix
            )));
        }
        if self.next_hops.len() > max_ecmp_paths {
            return Err(RouterError::out_of_range(format!(
                "{} next hops for {}, at most {} allowed",
                self.next_hops.len(),
                prefix,
                max_ecmp_paths
            )));
        }
        if self.action.is_forward() && self.next_hops.is_empty() {
            return Err(RouterError::invalid_parameter(format!(
                "forward route {} has no next hop",
                prefix
            )));
        }

        let mut seen = BTreeSet::new();
        for nh in &self.next_hops {
            if !nh.rif.is_valid() {
                return Err(RouterError::missing_parameter(format!("rif of next hop {}", nh.ip)));
            }
            if nh.ip.family() != prefix.family() {
                return Err(RouterError::invalid_parameter(format!(
                    "next hop {} is not {} like {}",
                    nh.ip,
                    prefix.family(),
                    prefix
                )));
            }
            if nh.ip.is_multicast() {
                return Err(RouterError::invalid_parameter(format!(
                    "next hop {} is a multicast address",
                    nh.ip
                )));
            }
            if !seen.insert(*nh) {
                return Err(RouterError::invalid_parameter(format!(
                    "next hop {} listed twice",
                    nh
                )));
            }
        }
        Ok(())
    }
}

/// A unicast route as returned by a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UcRouteEntry {
    pub prefix: IpPrefix,
    pub data: UcRouteData,
}

/// A unicast FIB mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UcRouteOp {
    Add(IpPrefix, UcRouteData),
    /// Creates the route or replaces all of its data.
    Set(IpPrefix, UcRouteData),
    Delete(IpPrefix),
    DeleteAll,
}

impl UcRouteOp {
    pub fn from_cmd(
        cmd: AccessCmd,
        key: Option<IpPrefix>,
        data: Option<&UcRouteData>,
    ) -> RouterResult<Self> {
        let need_key = || key.ok_or_else(|| RouterError::missing_parameter("route prefix"));
        let need_data = || {
            data.cloned()
                .ok_or_else(|| RouterError::missing_parameter("route data"))
        };
        match cmd {
            AccessCmd::Add => Ok(UcRouteOp::Add(need_key()?, need_data()?)),
            AccessCmd::Set => Ok(UcRouteOp::Set(need_key()?, need_data()?)),
            AccessCmd::Delete => Ok(UcRouteOp::Delete(need_key()?)),
            AccessCmd::DeleteAll => Ok(UcRouteOp::DeleteAll),
            other => Err(RouterError::cmd_unsupported(other, "uc_route_set")),
        }
    }
}
