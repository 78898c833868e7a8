//! Vendor-extension slot.
//!
//! Every router call accepts an optional [`VendorExt`]. The control plane
//! never interprets it; it is handed unchanged to the registered callbacks
//! so a platform layer can carry capabilities the core API does not model.

use serde::{Deserialize, Serialize};

/// Opaque, tagged extension payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorExt {
    /// Identifies the payload format to the platform layer.
    pub tag: u32,
    pub payload: Vec<u8>,
}

impl VendorExt {
    pub fn new(tag: u32, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
