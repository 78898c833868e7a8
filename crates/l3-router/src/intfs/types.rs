//! Router interface types and structures.

use crate::counter::RifCounter;
use l3_orch_common::HasRefCount;
use l3_sdk::{AccessCmd, RifId, RouterError, RouterResult};
use l3_types::{AdminState, IpFamily, MacAddress, PortId, VlanId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const MIN_MTU: u16 = 68;
pub const MAX_MTU: u16 = 9216;

/// The L2 construct a router interface is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RifBinding {
    Vlan(VlanId),
    Port(PortId),
}

impl fmt::Display for RifBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RifBinding::Vlan(vlan) => vlan.fmt(f),
            RifBinding::Port(port) => port.fmt(f),
        }
    }
}

/// Which packet marking the interface trusts for QoS classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QosTrust {
    #[default]
    None,
    Pcp,
    Dscp,
}

/// Configurable attributes of a router interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RifAttributes {
    pub mac: MacAddress,
    pub mtu: u16,
    /// Multicast packets with a TTL below this are not routed. 0 routes all.
    /// Enforced by the datapath; stored and returned here.
    #[serde(default)]
    pub mc_ttl_threshold: u8,
    /// Stored for the platform layer only.
    #[serde(default)]
    pub qos_trust: QosTrust,
}

impl RifAttributes {
    pub fn new(mac: MacAddress, mtu: u16) -> Self {
        Self {
            mac,
            mtu,
            mc_ttl_threshold: 0,
            qos_trust: QosTrust::None,
        }
    }

    pub fn validate(&self) -> RouterResult<()> {
        if !self.mac.is_valid_station() {
            return Err(RouterError::invalid_parameter(format!(
                "interface MAC {} is not a unicast station address",
                self.mac
            )));
        }
        if !(MIN_MTU..=MAX_MTU).contains(&self.mtu) {
            return Err(RouterError::out_of_range(format!(
                "MTU {} outside {}..={}",
                self.mtu, MIN_MTU, MAX_MTU
            )));
        }
        Ok(())
    }
}

/// Admin state of a router interface, per IP version and cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RifAdminState {
    pub ipv4_uc: AdminState,
    pub ipv6_uc: AdminState,
    pub ipv4_mc: AdminState,
    pub ipv6_mc: AdminState,
}

impl RifAdminState {
    /// Every IP version and cast in the same state.
    pub fn all(state: AdminState) -> Self {
        Self {
            ipv4_uc: state,
            ipv6_uc: state,
            ipv4_mc: state,
            ipv6_mc: state,
        }
    }

    pub fn unicast(&self, family: IpFamily) -> AdminState {
        match family {
            IpFamily::V4 => self.ipv4_uc,
            IpFamily::V6 => self.ipv6_uc,
        }
    }

    pub fn multicast(&self, family: IpFamily) -> AdminState {
        match family {
            IpFamily::V4 => self.ipv4_mc,
            IpFamily::V6 => self.ipv6_mc,
        }
    }
}

/// A router interface as returned by a get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterInterface {
    pub rif: RifId,
    pub binding: RifBinding,
    pub attrs: RifAttributes,
    pub counter_enabled: bool,
}

/// Table entry of a router interface.
#[derive(Debug, Clone)]
pub(crate) struct RifEntry {
    pub binding: RifBinding,
    pub attrs: RifAttributes,
    pub admin: RifAdminState,
    pub macs: Vec<MacAddress>,
    pub counter: Option<Arc<RifCounter>>,
    /// Neighbors, next hops and multicast routes using this rif.
    pub ref_count: u32,
}

impl RifEntry {
    pub fn new(binding: RifBinding, attrs: RifAttributes) -> Self {
        Self {
            binding,
            attrs,
            admin: RifAdminState::default(),
            macs: Vec::new(),
            counter: None,
            ref_count: 0,
        }
    }

    pub fn is_in_use(&self) -> bool {
        self.ref_count > 0 || self.counter.is_some()
    }
}

impl HasRefCount for RifEntry {
    fn increment_ref(&mut self) -> u32 {
        self.ref_count = self.ref_count.saturating_add(1);
        self.ref_count
    }

    fn decrement_ref(&mut self) -> Option<u32> {
        if self.ref_count == 0 {
            return None;
        }
        self.ref_count -= 1;
        Some(self.ref_count)
    }

    fn ref_count(&self) -> u32 {
        self.ref_count
    }
}

/// A router interface table mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceOp {
    Add {
        binding: RifBinding,
        attrs: RifAttributes,
    },
    /// Replaces the attributes. The binding cannot change; if given it must
    /// match the existing one.
    Edit {
        rif: RifId,
        binding: Option<RifBinding>,
        attrs: RifAttributes,
    },
    Delete(RifId),
    DeleteAll,
}

impl InterfaceOp {
    pub fn from_cmd(
        cmd: AccessCmd,
        rif: Option<RifId>,
        binding: Option<RifBinding>,
        attrs: Option<&RifAttributes>,
    ) -> RouterResult<Self> {
        let need_rif = || {
            rif.and_then(RifId::valid)
                .ok_or_else(|| RouterError::missing_parameter("rif"))
        };
        let need_attrs = || {
            attrs
                .cloned()
                .ok_or_else(|| RouterError::missing_parameter("interface attributes"))
        };
        match cmd {
            AccessCmd::Add => Ok(InterfaceOp::Add {
                binding: binding.ok_or_else(|| RouterError::missing_parameter("binding"))?,
                attrs: need_attrs()?,
            }),
            AccessCmd::Edit => Ok(InterfaceOp::Edit {
                rif: need_rif()?,
                binding,
                attrs: need_attrs()?,
            }),
            AccessCmd::Delete => Ok(InterfaceOp::Delete(need_rif()?)),
            AccessCmd::DeleteAll => Ok(InterfaceOp::DeleteAll),
            other => Err(RouterError::cmd_unsupported(other, "interface_set")),
        }
    }
}

/// A change to the additional MAC list of an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacListOp {
    Add(Vec<MacAddress>),
    Delete(Vec<MacAddress>),
    DeleteAll,
}

impl MacListOp {
    pub fn from_cmd(cmd: AccessCmd, macs: &[MacAddress]) -> RouterResult<Self> {
        let non_empty = || {
            if macs.is_empty() {
                Err(RouterError::invalid_parameter("empty MAC address list"))
            } else {
                Ok(macs.to_vec())
            }
        };
        match cmd {
            AccessCmd::Add => Ok(MacListOp::Add(non_empty()?)),
            AccessCmd::Delete => Ok(MacListOp::Delete(non_empty()?)),
            AccessCmd::DeleteAll => Ok(MacListOp::DeleteAll),
            other => Err(RouterError::cmd_unsupported(other, "interface_mac_set")),
        }
    }
}
