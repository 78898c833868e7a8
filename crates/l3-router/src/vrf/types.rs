//! Virtual router types.

use crate::types::ForwardAction;
use l3_sdk::{AccessCmd, RouterError, RouterResult, VrId};
use l3_types::{AdminState, IpFamily, MacAddress};
use serde::{Deserialize, Serialize};

/// Attributes of a virtual router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterAttributes {
    /// A family that is down yields no ECMP member for its routes.
    pub ipv4_state: AdminState,
    pub ipv6_state: AdminState,
    /// When false, unicast ADD and SET are rejected. Existing routes stay.
    pub uc_enabled: bool,
    /// When false, multicast ADD and egress ADD are rejected.
    pub mc_enabled: bool,
    /// Source MAC of routed packets. Zero means use the interface MAC.
    /// Stored for the platform layer only.
    pub router_mac: MacAddress,
    /// Applied by the datapath to packets that match no route: Trap or
    /// Drop. Stored for the platform layer only.
    pub miss_action: ForwardAction,
}

impl Default for RouterAttributes {
    fn default() -> Self {
        Self {
            ipv4_state: AdminState::Up,
            ipv6_state: AdminState::Up,
            uc_enabled: true,
            mc_enabled: true,
            router_mac: MacAddress::ZERO,
            miss_action: ForwardAction::Drop,
        }
    }
}

impl RouterAttributes {
    pub fn admin_state(&self, family: IpFamily) -> AdminState {
        match family {
            IpFamily::V4 => self.ipv4_state,
            IpFamily::V6 => self.ipv6_state,
        }
    }

    pub fn validate(&self) -> RouterResult<()> {
        if self.router_mac.is_multicast() {
            return Err(RouterError::invalid_parameter(format!(
                "router MAC {} is a multicast address",
                self.router_mac
            )));
        }
        if self.miss_action.is_forward() {
            return Err(RouterError::invalid_parameter(
                "FIB miss action must be TRAP or DROP",
            ));
        }
        Ok(())
    }
}

/// A virtual router table mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterOp {
    Add(RouterAttributes),
    Edit(VrId, RouterAttributes),
    Delete(VrId),
}

impl RouterOp {
    /// Builds a request from a raw command. ADD ignores `vrid`.
    pub fn from_cmd(
        cmd: AccessCmd,
        vrid: Option<VrId>,
        attrs: Option<&RouterAttributes>,
    ) -> RouterResult<Self> {
        let need_vrid = || {
            vrid.and_then(VrId::valid)
                .ok_or_else(|| RouterError::missing_parameter("vrid"))
        };
        let need_attrs = || {
            attrs
                .copied()
                .ok_or_else(|| RouterError::missing_parameter("router attributes"))
        };
        match cmd {
            AccessCmd::Add => Ok(RouterOp::Add(need_attrs()?)),
            AccessCmd::Edit => Ok(RouterOp::Edit(need_vrid()?, need_attrs()?)),
            AccessCmd::Delete => Ok(RouterOp::Delete(need_vrid()?)),
            other => Err(RouterError::cmd_unsupported(other, "router_set")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use l3_sdk::Status;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_attributes_are_valid() {
        let attrs = RouterAttributes::default();
        assert!(attrs.validate().is_ok());
        assert_eq!(attrs.admin_state(IpFamily::V6), AdminState::Up);
    }

    #[test]
    fn test_validate() {
        let attrs = RouterAttributes {
            router_mac: "01:00:5e:00:00:01".parse().unwrap(),
            ..Default::default()
        };
        assert_eq!(attrs.validate().unwrap_err().status(), Status::ParamError);

        let attrs = RouterAttributes {
            miss_action: ForwardAction::Forward,
            ..Default::default()
        };
        assert_eq!(attrs.validate().unwrap_err().status(), Status::ParamError);
    }

    #[test]
    fn test_from_cmd() {
        let attrs = RouterAttributes::default();
        assert_eq!(
            RouterOp::from_cmd(AccessCmd::Add, None, Some(&attrs)).unwrap(),
            RouterOp::Add(attrs)
        );
        assert_eq!(
            RouterOp::from_cmd(AccessCmd::Delete, Some(VrId::new(3)), None).unwrap(),
            RouterOp::Delete(VrId::new(3))
        );

        let err = RouterOp::from_cmd(AccessCmd::Edit, Some(VrId::INVALID), Some(&attrs))
            .unwrap_err();
        assert_eq!(err.status(), Status::ParamNull);

        let err = RouterOp::from_cmd(AccessCmd::DeleteAll, None, None).unwrap_err();
        assert_eq!(err.status(), Status::CmdUnsupported);
    }

    #[test]
    fn test_serde_defaults() {
        let attrs: RouterAttributes =
            serde_json::from_str(r#"{"ipv6_state": "down", "miss_action": "trap"}"#).unwrap();
        assert_eq!(attrs.ipv6_state, AdminState::Down);
        assert_eq!(attrs.miss_action, ForwardAction::Trap);
        assert!(attrs.uc_enabled);
    }
}
