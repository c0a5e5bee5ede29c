//! Values returned by protocol operations.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityTier;

/// Snapshot of a service's health and capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Tier the service really implements.
    pub tier: CapabilityTier,
    /// Protocol version of that tier.
    pub protocol_version: String,
    /// Number of live keys.
    pub key_count: usize,
    /// Name of the engine behind the service.
    pub engine: String,
}

impl ServiceStatus {
    /// Builds a status for `tier`, filling in its protocol version.
    pub fn new(tier: CapabilityTier, key_count: usize, engine: impl Into<String>) -> Self {
        Self {
            tier,
            protocol_version: tier.protocol_version().to_string(),
            key_count,
            engine: engine.into(),
        }
    }
}

/// Public view of a generated key pair. The private half stays in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairInfo {
    /// Identifier of the stored private key.
    pub identifier: String,
    /// Public key bytes.
    pub public_key: Vec<u8>,
    /// Key pair algorithm.
    pub algorithm: String,
}
