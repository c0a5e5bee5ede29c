//! Capability tiers and the operations each one defines.

use serde::{Deserialize, Serialize};

/// One tier of the capability lattice. Ordered `Basic < Standard < Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    /// Liveness and key synchronisation only.
    Basic,
    /// Everyday cryptography and key management.
    Standard,
    /// Everything, including backups and key pairs.
    Complete,
}

impl CapabilityTier {
    /// Protocol version string advertised by the tier.
    pub fn protocol_version(self) -> &'static str {
        match self {
            Self::Basic => "1.0",
            Self::Standard => "2.0",
            Self::Complete => "3.0",
        }
    }

    /// Whether an implementation of this tier defines `operation`.
    pub fn supports(self, operation: ProtocolOperation) -> bool {
        operation.min_tier() <= self
    }
}

impl std::fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Standard => write!(f, "standard"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Every operation in the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ProtocolOperation {
    Ping,
    SynchroniseKeys,
    Status,
    GetHardwareIdentifier,
    ResetSecurityData,
    GenerateRandomData,
    EncryptSecureData,
    DecryptSecureData,
    Sign,
    Verify,
    ImportKey,
    ListKeys,
    GetKeyInfo,
    DeleteKey,
    ExportKey,
    AuthenticatedEncrypt,
    AuthenticatedDecrypt,
    GenerateKeyPair,
    DeriveKey,
    CreateSecureBackup,
    RestoreSecureBackup,
}

impl ProtocolOperation {
    /// Every operation, lowest tier first.
    pub const ALL: [ProtocolOperation; 21] = [
        Self::Ping,
        Self::SynchroniseKeys,
        Self::Status,
        Self::GetHardwareIdentifier,
        Self::ResetSecurityData,
        Self::GenerateRandomData,
        Self::EncryptSecureData,
        Self::DecryptSecureData,
        Self::Sign,
        Self::Verify,
        Self::ImportKey,
        Self::ListKeys,
        Self::GetKeyInfo,
        Self::DeleteKey,
        Self::ExportKey,
        Self::AuthenticatedEncrypt,
        Self::AuthenticatedDecrypt,
        Self::GenerateKeyPair,
        Self::DeriveKey,
        Self::CreateSecureBackup,
        Self::RestoreSecureBackup,
    ];

    /// Stable camelCase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::SynchroniseKeys => "synchroniseKeys",
            Self::Status => "status",
            Self::GetHardwareIdentifier => "getHardwareIdentifier",
            Self::ResetSecurityData => "resetSecurityData",
            Self::GenerateRandomData => "generateRandomData",
            Self::EncryptSecureData => "encryptSecureData",
            Self::DecryptSecureData => "decryptSecureData",
            Self::Sign => "sign",
            Self::Verify => "verify",
            Self::ImportKey => "importKey",
            Self::ListKeys => "listKeys",
            Self::GetKeyInfo => "getKeyInfo",
            Self::DeleteKey => "deleteKey",
            Self::ExportKey => "exportKey",
            Self::AuthenticatedEncrypt => "authenticatedEncrypt",
            Self::AuthenticatedDecrypt => "authenticatedDecrypt",
            Self::GenerateKeyPair => "generateKeyPair",
            Self::DeriveKey => "deriveKey",
            Self::CreateSecureBackup => "createSecureBackup",
            Self::RestoreSecureBackup => "restoreSecureBackup",
        }
    }

    /// Lowest tier that defines the operation.
    pub fn min_tier(self) -> CapabilityTier {
        match self {
            Self::Ping | Self::SynchroniseKeys => CapabilityTier::Basic,
            Self::AuthenticatedEncrypt
            | Self::AuthenticatedDecrypt
            | Self::GenerateKeyPair
            | Self::DeriveKey
            | Self::CreateSecureBackup
            | Self::RestoreSecureBackup => CapabilityTier::Complete,
            _ => CapabilityTier::Standard,
        }
    }
}

impl std::fmt::Display for ProtocolOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_versions() {
        assert_eq!(CapabilityTier::Basic.protocol_version(), "1.0");
        assert_eq!(CapabilityTier::Standard.protocol_version(), "2.0");
        assert_eq!(CapabilityTier::Complete.protocol_version(), "3.0");
    }

    #[test]
    fn test_lattice_inclusion() {
        for op in ProtocolOperation::ALL {
            if CapabilityTier::Basic.supports(op) {
                assert!(CapabilityTier::Standard.supports(op));
            }
            if CapabilityTier::Standard.supports(op) {
                assert!(CapabilityTier::Complete.supports(op));
            }
            assert!(CapabilityTier::Complete.supports(op));
        }
    }

    #[test]
    fn test_basic_lacks_hardware_identifier() {
        assert!(CapabilityTier::Basic.supports(ProtocolOperation::Ping));
        assert!(!CapabilityTier::Basic.supports(ProtocolOperation::GetHardwareIdentifier));
        assert!(!CapabilityTier::Standard.supports(ProtocolOperation::CreateSecureBackup));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = ProtocolOperation::ALL.iter().map(|op| op.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ProtocolOperation::ALL.len());
    }
}
