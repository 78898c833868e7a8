//! Next-hop key.
//!
//! A next hop is a gateway address reached through a router interface. An
//! unspecified address makes it a directly attached next hop: the
//! destination itself is resolved on the interface.

use l3_sdk::RifId;
use l3_types::{IpAddress, IpFamily};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NextHop {
    pub ip: IpAddress,
    pub rif: RifId,
}

impl NextHop {
    pub fn new(ip: IpAddress, rif: RifId) -> Self {
        Self { ip, rif }
    }

    /// A next hop that resolves the destination directly on `rif`.
    pub fn attached(family: IpFamily, rif: RifId) -> Self {
        Self {
            ip: IpAddress::unspecified(family),
            rif,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.ip.is_unspecified()
    }
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_attached() {
            write!(f, "attached@{}", self.rif)
        } else {
            write!(f, "{}@{}", self.ip, self.rif)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        let nh = NextHop::new("10.0.0.1".parse().unwrap(), RifId::new(3));
        assert_eq!(nh.to_string(), "10.0.0.1@rif 3");
        assert!(!nh.is_attached());

        let attached = NextHop::attached(IpFamily::V6, RifId::new(4));
        assert!(attached.is_attached());
        assert_eq!(attached.to_string(), "attached@rif 4");
    }
}
