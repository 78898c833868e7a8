//! Common value types for the L3 router control plane.
//!
//! This crate provides type-safe representations of the network primitives
//! that the router, interface, neighbor and route tables are keyed on:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`IpAddress`]: IPv4 and IPv6 addresses with a total order
//! - [`IpPrefix`]: IP network prefixes (CIDR notation) with masking helpers
//! - [`VlanId`], [`PortId`]: the L2 constructs a router interface binds to
//! - [`AdminState`]: administrative up/down state

mod admin;
mod ip;
mod l2;
mod mac;

pub use admin::AdminState;
pub use ip::{IpAddress, IpFamily, IpPrefix, Ipv4Address, Ipv6Address};
pub use l2::{PortId, VlanId};
pub use mac::MacAddress;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid admin state: {0}")]
    InvalidAdminState(String),
}
