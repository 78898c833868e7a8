//! ECMP hash parameter and flow types.

use l3_sdk::{RouterError, RouterResult};
use l3_types::{IpAddress, PortId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hash function used to spread flows over next hops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcmpHashType {
    /// CRC-32 over the selected fields, seeded.
    #[default]
    Crc,
    /// XOR fold of the selected fields, seeded.
    Xor,
    /// Keyed pseudo-random hash; the seed selects the key.
    Random,
}

/// Packet fields that can take part in the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcmpHashField {
    SrcIp,
    DstIp,
    IpProtocol,
    SrcL4Port,
    DstL4Port,
    IngressPort,
    /// IPv6 flow label (20 bits).
    FlowLabel,
}

/// Router-scoped ECMP hash configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcmpHashParams {
    pub hash_type: EcmpHashType,
    pub fields: BTreeSet<EcmpHashField>,
    pub seed: u32,
    /// Hash (src, dst) and (dst, src) to the same value.
    pub symmetric: bool,
}

impl Default for EcmpHashParams {
    fn default() -> Self {
        Self {
            hash_type: EcmpHashType::Crc,
            fields: [
                EcmpHashField::SrcIp,
                EcmpHashField::DstIp,
                EcmpHashField::IpProtocol,
                EcmpHashField::SrcL4Port,
                EcmpHashField::DstL4Port,
            ]
            .into_iter()
            .collect(),
            seed: 0,
            symmetric: false,
        }
    }
}

impl EcmpHashParams {
    pub fn new(hash_type: EcmpHashType, fields: impl IntoIterator<Item = EcmpHashField>) -> Self {
        Self {
            hash_type,
            fields: fields.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    pub fn validate(&self) -> RouterResult<()> {
        if self.fields.is_empty() {
            return Err(RouterError::invalid_parameter(
                "ECMP hash needs at least one field",
            ));
        }
        Ok(())
    }
}

/// Header fields of one flow, as seen by the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub src_ip: IpAddress,
    pub dst_ip: IpAddress,
    pub ip_protocol: u8,
    pub src_l4_port: u16,
    pub dst_l4_port: u16,
    pub ingress_port: Option<PortId>,
    pub flow_label: u32,
}

impl FlowKey {
    pub fn new(src_ip: IpAddress, dst_ip: IpAddress, ip_protocol: u8) -> Self {
        Self {
            src_ip,
            dst_ip,
            ip_protocol,
            src_l4_port: 0,
            dst_l4_port: 0,
            ingress_port: None,
            flow_label: 0,
        }
    }

    pub fn with_ports(mut self, src_l4_port: u16, dst_l4_port: u16) -> Self {
        self.src_l4_port = src_l4_port;
        self.dst_l4_port = dst_l4_port;
        self
    }

    pub fn with_ingress_port(mut self, port: PortId) -> Self {
        self.ingress_port = Some(port);
        self
    }

    pub fn with_flow_label(mut self, label: u32) -> Self {
        self.flow_label = label;
        self
    }

    /// Returns the reply direction of this flow.
    pub fn reversed(&self) -> Self {
        Self {
            src_ip: self.dst_ip,
            dst_ip: self.src_ip,
            src_l4_port: self.dst_l4_port,
            dst_l4_port: self.src_l4_port,
            ..*self
        }
    }
}
