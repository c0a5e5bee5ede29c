//! # Umbra Crypto
//!
//! Cryptographic building blocks for the Umbra security core.
//!
//! This crate provides:
//! - [`SecureBuffer`], the zero-on-drop container for sensitive bytes
//! - [`OperationConfig`], the immutable per-operation configuration
//! - [`CryptoEngine`], the seam through which primitives are consumed
//! - [`SoftwareEngine`], a reference engine (AES-GCM, SHA-2, HMAC-SHA256,
//!   Ed25519, HKDF-SHA256, OS randomness)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod buffer;
pub mod config;
pub mod digest;
pub mod engine;
pub mod error;
pub mod kdf;
pub mod random;
pub mod signing;
pub mod software;

pub use buffer::SecureBuffer;
pub use config::OperationConfig;
pub use engine::{CryptoEngine, KeyPair};
pub use error::{BufferError, CryptoError};
pub use software::SoftwareEngine;
