//! L2 constructs a router interface can be bound to.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// IEEE 802.1Q VLAN identifier (1-4094).
///
/// VLAN 0 (priority tagged) and VLAN 4095 are reserved.
///
/// # Examples
///
/// ```
/// use l3_types::VlanId;
///
/// let vlan = VlanId::new(100).unwrap();
/// assert_eq!(vlan.as_u16(), 100);
/// assert!(VlanId::new(0).is_err());
/// assert!(VlanId::new(4095).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 4094;

    /// # Errors
    ///
    /// Returns an error if the VLAN ID is not in the valid range (1-4094).
    pub const fn new(id: u16) -> Result<Self, ParseError> {
        if id >= Self::MIN && id <= Self::MAX {
            Ok(VlanId(id))
        } else {
            Err(ParseError::InvalidVlanId(id))
        }
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vlan{}", self.0)
    }
}

impl FromStr for VlanId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both "100" and "Vlan100"
        let id_str = match s.get(..4) {
            Some(head) if head.eq_ignore_ascii_case("vlan") => &s[4..],
            _ => s,
        };
        let id: u16 = id_str.parse().map_err(|_| ParseError::InvalidVlanId(0))?;
        VlanId::new(id)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = ParseError;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        VlanId::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> u16 {
        vlan.0
    }
}

/// Logical switch port number.
///
/// Port 0 is reserved for the CPU port and cannot carry a router interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PortId(u32);

impl PortId {
    pub const CPU: u32 = 0;

    /// # Errors
    ///
    /// Returns an error for the CPU port.
    pub fn new(id: u32) -> Result<Self, ParseError> {
        if id == Self::CPU {
            return Err(ParseError::InvalidPort(format!(
                "port {} is the CPU port",
                id
            )));
        }
        Ok(PortId(id))
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ethernet{}", self.0)
    }
}

impl FromStr for PortId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id_str = s.strip_prefix("Ethernet").unwrap_or(s);
        let id: u32 = id_str
            .parse()
            .map_err(|_| ParseError::InvalidPort(s.to_string()))?;
        PortId::new(id)
    }
}

impl TryFrom<u32> for PortId {
    type Error = ParseError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        PortId::new(id)
    }
}

impl From<PortId> for u32 {
    fn from(port: PortId) -> u32 {
        port.0
    }
}
