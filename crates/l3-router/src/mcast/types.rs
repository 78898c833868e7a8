//! Multicast route types.

use crate::types::ForwardAction;
use l3_sdk::{AccessCmd, RifId, RouterError, RouterResult};
use l3_types::IpAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Key of a multicast route.
///
/// Orders by group, then source, then ingress rif.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct McRouteKey {
    pub group: IpAddress,
    /// Unspecified (0.0.0.0 or ::) for a (*,G) route.
    pub source: IpAddress,
    pub ingress_rif: RifId,
}

impl McRouteKey {
    pub fn new(group: IpAddress, source: IpAddress, ingress_rif: RifId) -> Self {
        Self {
            group,
            source,
            ingress_rif,
        }
    }

    /// A (*,G) key: any source of `group` arriving on `ingress_rif`.
    pub fn star_g(group: IpAddress, ingress_rif: RifId) -> Self {
        Self::new(group, IpAddress::unspecified(group.family()), ingress_rif)
    }

    pub fn is_star_g(&self) -> bool {
        self.source.is_unspecified()
    }

    pub fn validate(&self) -> RouterResult<()> {
        if !self.group.is_multicast() {
            return Err(RouterError::invalid_parameter(format!(
                "group {} is not a multicast address",
                self.group
            )));
        }
        if self.source.family() != self.group.family() {
            return Err(RouterError::invalid_parameter(format!(
                "source {} and group {} differ in family",
                self.source, self.group
            )));
        }
        if self.source.is_multicast() {
            return Err(RouterError::invalid_parameter(format!(
                "source {} is a multicast address",
                self.source
            )));
        }
        if !self.ingress_rif.is_valid() {
            return Err(RouterError::missing_parameter("ingress rif"));
        }
        Ok(())
    }
}

impl fmt::Display for McRouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_star_g() {
            write!(f, "(*, {}) iif {}", self.group, self.ingress_rif)
        } else {
            write!(f, "({}, {}) iif {}", self.source, self.group, self.ingress_rif)
        }
    }
}

/// Action and egress interfaces of a multicast route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McRouteData {
    pub action: ForwardAction,
    pub egress_rifs: Vec<RifId>,
}

impl McRouteData {
    pub fn new(action: ForwardAction, egress_rifs: Vec<RifId>) -> Self {
        Self {
            action,
            egress_rifs,
        }
    }

    pub fn validate(&self, key: &McRouteKey, max_egress: usize) -> RouterResult<()> {
        check_egress(key, &[], &self.egress_rifs, max_egress)
    }
}

/// Checks egress rifs that are about to join `current`.
pub(crate) fn check_egress(
    key: &McRouteKey,
    current: &[RifId],
    joining: &[RifId],
    max_egress: usize,
) -> RouterResult<()> {
    if current.len() + joining.len() > max_egress {
        return Err(RouterError::out_of_range(format!(
            "{} egress interfaces for {}, at most {} allowed",
            current.len() + joining.len(),
            key,
            max_egress
        )));
    }
    let mut seen = BTreeSet::new();
    for rif in joining {
        if !rif.is_valid() {
            return Err(RouterError::missing_parameter("egress rif"));
        }
        if *rif == key.ingress_rif {
            return Err(RouterError::invalid_parameter(format!(
                "{} is the ingress interface of {}",
                rif, key
            )));
        }
        if !seen.insert(*rif) {
            return Err(RouterError::invalid_parameter(format!("{} listed twice", rif)));
        }
        if current.contains(rif) {
            return Err(RouterError::already_exists(format!("{} egress of {}", rif, key)));
        }
    }
    Ok(())
}

/// A multicast route as returned by a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McRouteEntry {
    pub key: McRouteKey,
    pub data: McRouteData,
}

/// A multicast FIB mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McRouteOp {
    Add(McRouteKey, McRouteData),
    Delete(McRouteKey),
    DeleteAll,
}

impl McRouteOp {
    pub fn from_cmd(
        cmd: AccessCmd,
        key: Option<&McRouteKey>,
        data: Option<&McRouteData>,
    ) -> RouterResult<Self> {
        let need_key = || {
            key.copied()
                .ok_or_else(|| RouterError::missing_parameter("multicast route key"))
        };
        match cmd {
            AccessCmd::Add => Ok(McRouteOp::Add(
                need_key()?,
                data.cloned()
                    .ok_or_else(|| RouterError::missing_parameter("multicast route data"))?,
            )),
            AccessCmd::Delete => Ok(McRouteOp::Delete(need_key()?)),
            AccessCmd::DeleteAll => Ok(McRouteOp::DeleteAll),
            other => Err(RouterError::cmd_unsupported(other, "mc_route_set")),
        }
    }
}

/// An incremental change to the egress list of a multicast route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EgressOp {
    Add(Vec<RifId>),
    Delete(Vec<RifId>),
}

impl EgressOp {
    pub fn from_cmd(cmd: AccessCmd, rifs: &[RifId]) -> RouterResult<Self> {
        if matches!(cmd, AccessCmd::Add | AccessCmd::Delete) && rifs.is_empty() {
            return Err(RouterError::invalid_parameter("empty egress rif list"));
        }
        match cmd {
            AccessCmd::Add => Ok(EgressOp::Add(rifs.to_vec())),
            AccessCmd::Delete => Ok(EgressOp::Delete(rifs.to_vec())),
            other => Err(RouterError::cmd_unsupported(other, "mc_egress_rif_set")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use l3_sdk::Status;
    use pretty_assertions::assert_eq;

    fn ip(s: &str) -> IpAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_star_g_key() {
        let key = McRouteKey::star_g(ip("239.1.1.1"), RifId::new(1));
        assert!(key.is_star_g());
        assert_eq!(key.source, ip("0.0.0.0"));
        assert!(key.validate().is_ok());
        assert_eq!(key.to_string(), "(*, 239.1.1.1) iif rif 1");
    }

    #[test]
    fn test_key_validation() {
        let unicast_group = McRouteKey::star_g(ip("10.1.1.1"), RifId::new(1));
        assert_eq!(unicast_group.validate().unwrap_err().status(), Status::ParamError);

        let mixed = McRouteKey::new(ip("ff0e::1"), ip("10.0.0.1"), RifId::new(1));
        assert_eq!(mixed.validate().unwrap_err().status(), Status::ParamError);

        let no_iif = McRouteKey::star_g(ip("ff0e::1"), RifId::INVALID);
        assert_eq!(no_iif.validate().unwrap_err().status(), Status::ParamNull);
    }

    #[test]
    fn test_key_order_groups_first() {
        let a = McRouteKey::new(ip("239.0.0.1"), ip("10.0.0.9"), RifId::new(9));
        let b = McRouteKey::star_g(ip("239.0.0.2"), RifId::new(1));
        assert!(a < b);
    }

    #[test]
    fn test_egress_checks() {
        let key = McRouteKey::star_g(ip("239.1.1.1"), RifId::new(1));
        let rifs = |ids: &[u32]| ids.iter().map(|i| RifId::new(*i)).collect::<Vec<_>>();

        assert!(check_egress(&key, &rifs(&[2]), &rifs(&[3, 4]), 4).is_ok());
        assert_eq!(
            check_egress(&key, &rifs(&[2]), &rifs(&[3, 4]), 2).unwrap_err().status(),
            Status::ParamExceedsRange
        );
        assert_eq!(
            check_egress(&key, &[], &rifs(&[1]), 4).unwrap_err().status(),
            Status::ParamError
        );
        assert_eq!(
            check_egress(&key, &[], &rifs(&[2, 2]), 4).unwrap_err().status(),
            Status::ParamError
        );
        assert_eq!(
            check_egress(&key, &rifs(&[2]), &rifs(&[2]), 4).unwrap_err().status(),
            Status::EntryAlreadyExists
        );
    }

    #[test]
    fn test_egress_op_from_cmd() {
        let err = EgressOp::from_cmd(AccessCmd::Add, &[]).unwrap_err();
        assert_eq!(err.status(), Status::ParamError);
        let err = EgressOp::from_cmd(AccessCmd::DeleteAll, &[RifId::new(1)]).unwrap_err();
        assert_eq!(err.status(), Status::CmdUnsupported);
    }
}
