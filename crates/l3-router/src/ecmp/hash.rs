//! Flow hashing and member selection.

use super::types::{EcmpHashField, EcmpHashParams, EcmpHashType, FlowKey};

const CRC32_POLY: u32 = 0xEDB8_8320;
const FLOW_LABEL_MASK: u32 = 0x000F_FFFF;

// Fixed keys so the keyed hash is stable for a given seed.
const RANDOM_K1: u64 = 0x243F_6A88_85A3_08D3;
const RANDOM_K2: u64 = 0x1319_8A2E_0370_7344;
const RANDOM_K3: u64 = 0xA409_3822_299F_31D0;

/// Hashes a flow over the fields selected in `params`.
pub fn flow_hash(params: &EcmpHashParams, flow: &FlowKey) -> u32 {
    let data = hash_input(params, flow);
    match params.hash_type {
        EcmpHashType::Crc => crc32(params.seed, &data),
        EcmpHashType::Xor => xor_fold(&data) ^ params.seed,
        EcmpHashType::Random => {
            let state = ahash::RandomState::with_seeds(
                u64::from(params.seed),
                RANDOM_K1,
                RANDOM_K2,
                RANDOM_K3,
            );
            let h = state.hash_one(&data);
            (h ^ (h >> 32)) as u32
        }
    }
}

/// Picks a member index in `0..members` for a flow.
///
/// Returns `None` when there are no members.
pub fn select_index(params: &EcmpHashParams, flow: &FlowKey, members: usize) -> Option<usize> {
    if members == 0 {
        return None;
    }
    Some(flow_hash(params, flow) as usize % members)
}

/// Serializes the selected fields in field order.
///
/// In symmetric mode each (src, dst) pair is written lower value first, so
/// a flow and its reverse produce the same bytes.
fn hash_input(params: &EcmpHashParams, flow: &FlowKey) -> Vec<u8> {
    let (src_ip, dst_ip) = ordered(params.symmetric, flow.src_ip, flow.dst_ip);
    let (src_port, dst_port) = ordered(params.symmetric, flow.src_l4_port, flow.dst_l4_port);

    let mut data = Vec::with_capacity(48);
    for field in &params.fields {
        match field {
            EcmpHashField::SrcIp => data.extend(src_ip.to_bytes()),
            EcmpHashField::DstIp => data.extend(dst_ip.to_bytes()),
            EcmpHashField::IpProtocol => data.push(flow.ip_protocol),
            EcmpHashField::SrcL4Port => data.extend(src_port.to_be_bytes()),
            EcmpHashField::DstL4Port => data.extend(dst_port.to_be_bytes()),
            EcmpHashField::IngressPort => {
                let port = flow.ingress_port.map(|p| p.as_u32()).unwrap_or(0);
                data.extend(port.to_be_bytes());
            }
            EcmpHashField::FlowLabel => {
                data.extend((flow.flow_label & FLOW_LABEL_MASK).to_be_bytes())
            }
        }
    }
    data
}

fn ordered<T: Ord>(symmetric: bool, a: T, b: T) -> (T, T) {
    if symmetric && b < a {
        (b, a)
    } else {
        (a, b)
    }
}

fn crc32(seed: u32, data: &[u8]) -> u32 {
    let mut crc = !seed;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (CRC32_POLY & mask);
        }
    }
    !crc
}

fn xor_fold(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |acc, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        acc ^ u32::from_be_bytes(word)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn flow(src: &str, dst: &str, sport: u16, dport: u16) -> FlowKey {
        FlowKey::new(src.parse().unwrap(), dst.parse().unwrap(), 17).with_ports(sport, dport)
    }

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(crc32(0, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_hash_is_stable() {
        for hash_type in [EcmpHashType::Crc, EcmpHashType::Xor, EcmpHashType::Random] {
            let params = EcmpHashParams {
                hash_type,
                ..Default::default()
            };
            let f = flow("10.1.1.1", "10.2.2.2", 4000, 53);
            assert_eq!(flow_hash(&params, &f), flow_hash(&params, &f));
        }
    }

    #[test]
    fn test_symmetric_hash() {
        for hash_type in [EcmpHashType::Crc, EcmpHashType::Xor, EcmpHashType::Random] {
            let params = EcmpHashParams {
                hash_type,
                ..Default::default()
            }
            .with_symmetric(true);
            let f = flow("2001:db8::1", "2001:db8::2", 33000, 443);
            assert_eq!(flow_hash(&params, &f), flow_hash(&params, &f.reversed()));
        }
    }

    #[test]
    fn test_unselected_fields_are_ignored() {
        let params = EcmpHashParams::new(
            EcmpHashType::Crc,
            [EcmpHashField::SrcIp, EcmpHashField::DstIp],
        );
        let a = flow("10.0.0.1", "10.0.0.2", 1, 2);
        let b = flow("10.0.0.1", "10.0.0.2", 999, 888);
        assert_eq!(flow_hash(&params, &a), flow_hash(&params, &b));
    }

    #[test]
    fn test_seed_changes_crc() {
        let f = flow("10.0.0.1", "10.0.0.2", 1, 2);
        let a = EcmpHashParams::default();
        let b = EcmpHashParams::default().with_seed(0xdead_beef);
        assert_ne!(flow_hash(&a, &f), flow_hash(&b, &f));
    }

    #[test]
    fn test_select_index_bounds() {
        let params = EcmpHashParams::default();
        let f = flow("10.0.0.1", "10.0.0.2", 1, 2);
        assert_eq!(select_index(&params, &f, 0), None);
        assert_eq!(select_index(&params, &f, 1), Some(0));
        for members in 1..16 {
            let idx = select_index(&params, &f, members).unwrap();
            assert!(idx < members);
        }
    }

    #[test]
    fn test_flows_spread_over_members() {
        let params = EcmpHashParams::default();
        let mut used = [false; 4];
        for port in 0..64u16 {
            let f = flow("10.0.0.1", "10.0.0.2", 1000 + port, 80);
            used[select_index(&params, &f, 4).unwrap()] = true;
        }
        assert!(used.iter().all(|u| *u));
    }
}
