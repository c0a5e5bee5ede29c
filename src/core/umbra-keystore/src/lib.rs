//! # Umbra KeyStore
//!
//! In-memory owner of every managed key.
//!
//! ## Lifecycle
//!
//! - `generate` / `import` create a record in the `active` state
//! - `rotate` replaces the material under the same identifier, optionally
//!   re-encrypting caller data from the old key to the new one
//! - `delete` zeroes the material and leaves a tombstone so the identifier is
//!   never handed out again
//!
//! Operations on the same identifier are serialized by a per-record lock.
//! Operations on different identifiers proceed independently.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod store;

pub use error::KeyStoreError;
pub use record::{KeyEntry, KeyInfo, KeyKind, KeyStatus, Rotation};
pub use store::KeyStore;
