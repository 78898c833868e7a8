//! Router configuration.
//!
//! [`RouterConfig`] holds the table capacities and per-entry limits of the
//! emulated ASIC plus the ECMP hash parameters new routers start with. It
//! deserializes from JSON; every field is optional and falls back to the
//! value in [`RouterConfig::default`].

use crate::ecmp::EcmpHashParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Table capacities and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Virtual routers; vrids are allocated from `0..max_routers`.
    pub max_routers: u32,
    /// Router interfaces across all routers; rifs come from `0..max_rifs`.
    pub max_rifs: u32,
    pub max_neighbors: u32,
    pub max_uc_routes: u32,
    pub max_mc_routes: u32,
    /// Interface counters that can be allocated at once.
    pub max_counters: u32,
    /// Next hops per unicast route.
    pub max_ecmp_paths: u16,
    /// Additional MAC addresses per router interface.
    pub max_macs_per_rif: u16,
    /// Egress interfaces per multicast route.
    pub max_mc_egress: u16,
    /// Hash parameters a router gets on ADD.
    pub default_ecmp: EcmpHashParams,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_routers: 64,
            max_rifs: 1024,
            max_neighbors: 16384,
            max_uc_routes: 65536,
            max_mc_routes: 4096,
            max_counters: 1024,
            max_ecmp_paths: 64,
            max_macs_per_rif: 32,
            max_mc_egress: 256,
            default_ecmp: EcmpHashParams::default(),
        }
    }
}

impl RouterConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_routers == 0 {
            return Err(ConfigError::Invalid("max_routers must be at least 1".into()));
        }
        if self.max_ecmp_paths == 0 {
            return Err(ConfigError::Invalid(
                "max_ecmp_paths must be at least 1".into(),
            ));
        }
        // u32::MAX is the invalid object id.
        if self.max_routers == u32::MAX || self.max_rifs == u32::MAX {
            return Err(ConfigError::Invalid(
                "object id space must leave room for the invalid id".into(),
            ));
        }
        self.default_ecmp
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("default_ecmp: {}", e)))
    }
}
