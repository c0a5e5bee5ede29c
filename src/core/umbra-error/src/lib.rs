//! # Umbra Error
//!
//! The canonical error taxonomy for Umbra.
//!
//! Every layer of the security core (secure buffers, the crypto engine, the
//! key store, the modern protocol surface and the legacy bridge) keeps its
//! own error enum. Each of them converts to and from [`CanonicalError`]
//! through the [`Canonical`] trait without dropping the original reason text.
//!
//! Structured error fields are carried inside the canonical `detail` using
//! the format documented in [`detail`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod canonical;
pub mod detail;
pub mod kind;

pub use canonical::{Canonical, CanonicalError};
pub use kind::ErrorKind;
