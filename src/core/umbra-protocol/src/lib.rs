//! # Umbra Protocol
//!
//! The versioned, capability-tiered interface of the security service.
//!
//! ## Tiers
//!
//! | Tier | Version | Adds |
//! |---|---|---|
//! | [`BasicProtocol`] | `1.0` | ping, key synchronisation |
//! | [`StandardProtocol`] | `2.0` | status, random data, encrypt/decrypt, sign/verify, key management |
//! | [`CompleteProtocol`] | `3.0` | AEAD with associated data, key pairs, derivation, backups |
//!
//! A lower-tier implementation is lifted with [`StandardAdapter`] or
//! [`CompleteAdapter`]. Lifted objects keep reporting their real tier, and
//! every operation they lack fails with a permanent
//! `OperationNotSupported`.
//!
//! Older services that signal failure with `None` or `false` are exposed
//! through [`LegacyBridge`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod capability;
pub mod error;
pub mod legacy;
pub mod repr;
pub mod traits;
pub mod types;

pub use adapter::{CompleteAdapter, StandardAdapter};
pub use capability::{CapabilityTier, ProtocolOperation};
pub use error::{LegacyError, ProtocolError};
pub use legacy::{LegacyBridge, LegacyService};
pub use repr::ByteRepr;
pub use traits::{BasicProtocol, CompleteProtocol, StandardProtocol};
pub use types::{KeyPairInfo, ServiceStatus};
pub use umbra_keystore::KeyInfo;
