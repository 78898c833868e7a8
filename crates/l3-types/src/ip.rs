//! IP address and prefix types.
//!
//! Addresses and prefixes carry a total order (IPv4 sorts before IPv6,
//! numeric order within a family) so they can key ordered tables that are
//! paged through with first/next cursors.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family of an [`IpAddress`] or [`IpPrefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Returns the host-route prefix length for this family.
    pub const fn max_prefix_len(&self) -> u8 {
        match self {
            IpFamily::V4 => 32,
            IpFamily::V6 => 128,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "ipv4"),
            IpFamily::V6 => write!(f, "ipv6"),
        }
    }
}

/// An IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ipv4Address(Ipv4Addr);

impl Ipv4Address {
    pub const UNSPECIFIED: Self = Ipv4Address(Ipv4Addr::UNSPECIFIED);
    pub const BROADCAST: Self = Ipv4Address(Ipv4Addr::BROADCAST);

    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Ipv4Address(Ipv4Addr::new(a, b, c, d))
    }

    pub const fn inner(&self) -> Ipv4Addr {
        self.0
    }

    pub const fn octets(&self) -> [u8; 4] {
        self.0.octets()
    }

    /// Returns true for 224.0.0.0/4.
    pub const fn is_multicast(&self) -> bool {
        self.0.octets()[0] & 0xf0 == 0xe0
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Ipv4Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv4Addr>()
            .map(Ipv4Address)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl From<Ipv4Addr> for Ipv4Address {
    fn from(addr: Ipv4Addr) -> Self {
        Ipv4Address(addr)
    }
}

impl From<Ipv4Address> for Ipv4Addr {
    fn from(addr: Ipv4Address) -> Self {
        addr.0
    }
}

/// An IPv6 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ipv6Address(Ipv6Addr);

impl Ipv6Address {
    pub const UNSPECIFIED: Self = Ipv6Address(Ipv6Addr::UNSPECIFIED);

    #[allow(clippy::too_many_arguments)]
    pub const fn new(a: u16, b: u16, c: u16, d: u16, e: u16, f: u16, g: u16, h: u16) -> Self {
        Ipv6Address(Ipv6Addr::new(a, b, c, d, e, f, g, h))
    }

    pub const fn inner(&self) -> Ipv6Addr {
        self.0
    }

    pub const fn octets(&self) -> [u8; 16] {
        self.0.octets()
    }

    pub const fn segments(&self) -> [u16; 8] {
        self.0.segments()
    }

    /// Returns true if this is a link-local address (fe80::/10).
    pub fn is_link_local(&self) -> bool {
        (self.segments()[0] & 0xffc0) == 0xfe80
    }

    /// Returns true for ff00::/8.
    pub const fn is_multicast(&self) -> bool {
        self.0.octets()[0] == 0xff
    }
}

impl fmt::Display for Ipv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Ipv6Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv6Addr>()
            .map(Ipv6Address)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl From<Ipv6Addr> for Ipv6Address {
    fn from(addr: Ipv6Addr) -> Self {
        Ipv6Address(addr)
    }
}

impl From<Ipv6Address> for Ipv6Addr {
    fn from(addr: Ipv6Address) -> Self {
        addr.0
    }
}

/// An IP address that can be either IPv4 or IPv6.
///
/// The derived order places every IPv4 address before every IPv6 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpAddress {
    V4(Ipv4Address),
    V6(Ipv6Address),
}

impl IpAddress {
    /// Returns the unspecified address (0.0.0.0 or ::) of a family.
    pub const fn unspecified(family: IpFamily) -> Self {
        match family {
            IpFamily::V4 => IpAddress::V4(Ipv4Address::UNSPECIFIED),
            IpFamily::V6 => IpAddress::V6(Ipv6Address::UNSPECIFIED),
        }
    }

    pub const fn family(&self) -> IpFamily {
        match self {
            IpAddress::V4(_) => IpFamily::V4,
            IpAddress::V6(_) => IpFamily::V6,
        }
    }

    /// Returns true if this is an IPv4 address.
    pub const fn is_ipv4(&self) -> bool {
        matches!(self, IpAddress::V4(_))
    }

    /// Returns true if this is an IPv6 address.
    pub const fn is_ipv6(&self) -> bool {
        matches!(self, IpAddress::V6(_))
    }

    pub const fn is_multicast(&self) -> bool {
        match self {
            IpAddress::V4(addr) => addr.is_multicast(),
            IpAddress::V6(addr) => addr.is_multicast(),
        }
    }

    pub fn is_unspecified(&self) -> bool {
        match self {
            IpAddress::V4(addr) => addr.inner().is_unspecified(),
            IpAddress::V6(addr) => addr.inner().is_unspecified(),
        }
    }

    /// Returns the IPv4 address if this is V4, None otherwise.
    pub const fn as_ipv4(&self) -> Option<&Ipv4Address> {
        match self {
            IpAddress::V4(addr) => Some(addr),
            IpAddress::V6(_) => None,
        }
    }

    /// Returns the IPv6 address if this is V6, None otherwise.
    pub const fn as_ipv6(&self) -> Option<&Ipv6Address> {
        match self {
            IpAddress::V4(_) => None,
            IpAddress::V6(addr) => Some(addr),
        }
    }

    /// Returns the address bytes in network order (4 or 16 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            IpAddress::V4(addr) => addr.octets().to_vec(),
            IpAddress::V6(addr) => addr.octets().to_vec(),
        }
    }

    /// Keeps the leading `len` bits of the address and zeroes the rest.
    ///
    /// `len` is clamped to the family's maximum prefix length.
    pub fn masked(&self, len: u8) -> Self {
        match self {
            IpAddress::V4(addr) => {
                let bits = u32::from(addr.inner());
                let mask = match len {
                    0 => 0,
                    l if l >= 32 => u32::MAX,
                    l => u32::MAX << (32 - u32::from(l)),
                };
                IpAddress::V4(Ipv4Address(Ipv4Addr::from(bits & mask)))
            }
            IpAddress::V6(addr) => {
                let bits = u128::from(addr.inner());
                let mask = match len {
                    0 => 0,
                    l if l >= 128 => u128::MAX,
                    l => u128::MAX << (128 - u32::from(l)),
                };
                IpAddress::V6(Ipv6Address(Ipv6Addr::from(bits & mask)))
            }
        }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpAddress::V4(addr) => addr.fmt(f),
            IpAddress::V6(addr) => addr.fmt(f),
        }
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            s.parse::<Ipv6Address>().map(IpAddress::V6)
        } else {
            s.parse::<Ipv4Address>().map(IpAddress::V4)
        }
    }
}

impl From<Ipv4Address> for IpAddress {
    fn from(addr: Ipv4Address) -> Self {
        IpAddress::V4(addr)
    }
}

impl From<Ipv6Address> for IpAddress {
    fn from(addr: Ipv6Address) -> Self {
        IpAddress::V6(addr)
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        IpAddress::V4(Ipv4Address(addr))
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(addr: Ipv6Addr) -> Self {
        IpAddress::V6(Ipv6Address(addr))
    }
}

/// An IP prefix in CIDR notation (e.g., 10.0.0.0/24 or 2001:db8::/32).
///
/// Orders by address first and prefix length second, so a /8 sorts before
/// the /16 that shares its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IpPrefix {
    address: IpAddress,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// The address is stored as given; use [`IpPrefix::is_canonical`] to
    /// check for host bits.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is invalid for the address type
    /// (>32 for IPv4, >128 for IPv6).
    pub fn new(address: IpAddress, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = address.family().max_prefix_len();
        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Returns the prefix of length `len` that covers `address`.
    pub fn covering(address: IpAddress, len: u8) -> Result<Self, ParseError> {
        IpPrefix::new(address.masked(len), len)
    }

    /// Returns the host route (/32 or /128) for an address.
    pub fn host(address: IpAddress) -> Self {
        IpPrefix {
            address,
            prefix_len: address.family().max_prefix_len(),
        }
    }

    /// Returns the network address of this prefix.
    pub const fn address(&self) -> &IpAddress {
        &self.address
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub const fn family(&self) -> IpFamily {
        self.address.family()
    }

    /// Returns true if this is an IPv4 prefix.
    pub const fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    /// Returns true if this is an IPv6 prefix.
    pub const fn is_ipv6(&self) -> bool {
        self.address.is_ipv6()
    }

    /// Returns true if this is a host route (/32 for IPv4, /128 for IPv6).
    pub const fn is_host_route(&self) -> bool {
        self.prefix_len == self.address.family().max_prefix_len()
    }

    /// Returns true if this is the default route (0.0.0.0/0 or ::/0).
    pub fn is_default(&self) -> bool {
        self.prefix_len == 0
    }

    /// Returns the prefix with its host bits cleared.
    pub fn network(&self) -> Self {
        IpPrefix {
            address: self.address.masked(self.prefix_len),
            prefix_len: self.prefix_len,
        }
    }

    /// Returns true if no host bits are set.
    pub fn is_canonical(&self) -> bool {
        self.address.masked(self.prefix_len) == self.address
    }

    /// Returns true if `addr` falls inside this prefix.
    pub fn contains(&self, addr: &IpAddress) -> bool {
        addr.family() == self.family()
            && addr.masked(self.prefix_len) == self.address.masked(self.prefix_len)
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, len_str) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseError::InvalidIpPrefix(s.to_string()))?;

        let address: IpAddress = addr_str.parse()?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(address, prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ip_address_discrimination() {
        let v4: IpAddress = "10.0.0.1".parse().unwrap();
        assert!(v4.is_ipv4());
        assert_eq!(v4.family(), IpFamily::V4);

        let v6: IpAddress = "::1".parse().unwrap();
        assert!(v6.is_ipv6());
        assert_eq!(v6.family(), IpFamily::V6);
    }

    #[test]
    fn test_ipv4_sorts_before_ipv6() {
        let v4: IpAddress = "255.255.255.255".parse().unwrap();
        let v6: IpAddress = "::".parse().unwrap();
        assert!(v4 < v6);

        let a: IpAddress = "10.0.0.2".parse().unwrap();
        let b: IpAddress = "10.0.0.10".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_multicast_detection() {
        assert!("224.0.0.5".parse::<IpAddress>().unwrap().is_multicast());
        assert!("239.255.1.1".parse::<IpAddress>().unwrap().is_multicast());
        assert!(!"192.168.1.1".parse::<IpAddress>().unwrap().is_multicast());
        assert!("ff02::1".parse::<IpAddress>().unwrap().is_multicast());
        assert!(!"2001:db8::1".parse::<IpAddress>().unwrap().is_multicast());
    }

    #[test]
    fn test_masking() {
        let addr: IpAddress = "10.1.2.3".parse().unwrap();
        assert_eq!(addr.masked(16).to_string(), "10.1.0.0");
        assert_eq!(addr.masked(0).to_string(), "0.0.0.0");
        assert_eq!(addr.masked(32), addr);

        let v6: IpAddress = "2001:db8:1:2::5".parse().unwrap();
        assert_eq!(v6.masked(32).to_string(), "2001:db8::");
    }

    #[test]
    fn test_ip_prefix_parse() {
        let prefix: IpPrefix = "10.0.0.0/24".parse().unwrap();
        assert!(prefix.is_ipv4());
        assert_eq!(prefix.prefix_len(), 24);

        let v6_prefix: IpPrefix = "2001:db8::/32".parse().unwrap();
        assert!(v6_prefix.is_ipv6());
        assert_eq!(v6_prefix.prefix_len(), 32);
    }

    #[test]
    fn test_canonical_and_network() {
        let prefix: IpPrefix = "10.0.0.1/24".parse().unwrap();
        assert!(!prefix.is_canonical());
        assert_eq!(prefix.network().to_string(), "10.0.0.0/24");
        assert!(prefix.network().is_canonical());
    }

    #[test]
    fn test_contains() {
        let prefix: IpPrefix = "10.1.0.0/16".parse().unwrap();
        assert!(prefix.contains(&"10.1.200.3".parse().unwrap()));
        assert!(!prefix.contains(&"10.2.0.1".parse().unwrap()));
        assert!(!prefix.contains(&"::1".parse().unwrap()));

        let default: IpPrefix = "0.0.0.0/0".parse().unwrap();
        assert!(default.contains(&"8.8.8.8".parse().unwrap()));
    }

    #[test]
    fn test_covering_and_host() {
        let addr: IpAddress = "192.168.7.9".parse().unwrap();
        let covering = IpPrefix::covering(addr, 20).unwrap();
        assert_eq!(covering.to_string(), "192.168.0.0/20");
        assert!(IpPrefix::host(addr).is_host_route());
    }

    #[test]
    fn test_prefix_ordering() {
        let a: IpPrefix = "10.0.0.0/8".parse().unwrap();
        let b: IpPrefix = "10.0.0.0/16".parse().unwrap();
        let c: IpPrefix = "10.1.0.0/16".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_invalid_prefix_length() {
        assert!("10.0.0.0/33".parse::<IpPrefix>().is_err());
        assert!("2001:db8::/129".parse::<IpPrefix>().is_err());
    }

    #[test]
    fn test_display() {
        let prefix: IpPrefix = "192.168.0.0/16".parse().unwrap();
        assert_eq!(prefix.to_string(), "192.168.0.0/16");
    }
}
