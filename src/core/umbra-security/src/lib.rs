//! # Umbra Security
//!
//! Operation dispatch, error translation and configuration, plus
//! [`SecurityService`], the complete-tier protocol implementation.
//!
//! ## Example
//!
//! ```no_run
//! use umbra_protocol::StandardProtocol;
//! use umbra_security::{SecurityService, Settings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = SecurityService::software(Settings::default());
//! let ciphertext = service.encrypt_secure_data(b"hello", None).await?;
//! let plaintext = service
//!     .decrypt_secure_data(ciphertext.as_bytes(), None)
//!     .await?;
//! assert_eq!(plaintext.as_bytes(), b"hello");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bundle;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod operation;
pub mod resolver;
pub mod result;
pub mod service;
pub mod settings;
pub mod translator;

pub use bundle::KeyBundle;
pub use dispatcher::OperationDispatcher;
pub use error::SettingsError;
pub use input::{KeyReference, OperationInput};
pub use operation::SecurityOperation;
pub use resolver::ConfigResolver;
pub use result::{OperationResult, Payload};
pub use service::SecurityService;
pub use settings::{BackupKdfSettings, Settings};
pub use translator::{ErrorTranslator, LayerError, TargetLayer};
