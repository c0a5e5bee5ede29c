//! Per-call input to the dispatcher.

use std::collections::BTreeMap;

use umbra_crypto::SecureBuffer;

/// How an operation names its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyReference {
    /// A key held by the store.
    Identifier(String),
    /// Caller-supplied material.
    Material(SecureBuffer),
}

/// Data, key and signature for one dispatch.
#[derive(Debug, Clone, Default)]
pub struct OperationInput {
    data: Option<SecureBuffer>,
    key: Option<KeyReference>,
    signature: Option<Vec<u8>>,
    metadata: BTreeMap<String, String>,
}

impl OperationInput {
    /// An input with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Input carrying only `data`.
    pub fn data(data: impl Into<SecureBuffer>) -> Self {
        Self::new().with_data(data)
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<SecureBuffer>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Names a stored key.
    #[must_use]
    pub fn with_key_id(mut self, identifier: impl Into<String>) -> Self {
        self.key = Some(KeyReference::Identifier(identifier.into()));
        self
    }

    /// Supplies raw key material.
    #[must_use]
    pub fn with_key_material(mut self, material: SecureBuffer) -> Self {
        self.key = Some(KeyReference::Material(material));
        self
    }

    /// Sets the signature to verify.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<Vec<u8>>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Adds a metadata label, used by key generation.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The payload, if any.
    pub fn payload(&self) -> Option<&SecureBuffer> {
        self.data.as_ref()
    }

    /// The key reference, if any.
    pub fn key(&self) -> Option<&KeyReference> {
        self.key.as_ref()
    }

    /// The identifier of the referenced key, if it is a stored key.
    pub fn key_id(&self) -> Option<&str> {
        match &self.key {
            Some(KeyReference::Identifier(id)) => Some(id),
            _ => None,
        }
    }

    /// The signature, if any.
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// Metadata labels.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let input = OperationInput::data(b"hello".as_slice())
            .with_key_id("k1")
            .with_signature(vec![1, 2])
            .with_metadata("owner", "billing");

        assert_eq!(input.payload().unwrap().as_bytes(), b"hello");
        assert_eq!(input.key_id(), Some("k1"));
        assert_eq!(input.signature(), Some(&[1u8, 2][..]));
        assert_eq!(input.metadata().get("owner").map(String::as_str), Some("billing"));
    }

    #[test]
    fn test_material_replaces_identifier() {
        let input = OperationInput::new()
            .with_key_id("k1")
            .with_key_material(SecureBuffer::zeroed(16));
        assert_eq!(input.key_id(), None);
        assert!(matches!(input.key(), Some(KeyReference::Material(_))));
    }
}
