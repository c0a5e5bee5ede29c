//! Byte representations accepted at the legacy boundary.

use umbra_crypto::SecureBuffer;

/// A byte container a legacy service may hand back.
///
/// The bridge converts every such value into a [`SecureBuffer`] once, so the
/// rest of the lattice only ever sees one representation.
pub trait ByteRepr: Send {
    /// Moves the bytes into a secure buffer.
    fn into_secure(self) -> SecureBuffer;
}

impl ByteRepr for Vec<u8> {
    fn into_secure(self) -> SecureBuffer {
        SecureBuffer::new(self)
    }
}

impl ByteRepr for Box<[u8]> {
    fn into_secure(self) -> SecureBuffer {
        SecureBuffer::new(self.into_vec())
    }
}

impl ByteRepr for SecureBuffer {
    fn into_secure(self) -> SecureBuffer {
        self
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_all_representations_convert() {
        assert_eq!(vec![1u8, 2].into_secure().as_bytes(), &[1, 2]);
        assert_eq!(
            vec![3u8, 4].into_boxed_slice().into_secure().as_bytes(),
            &[3, 4]
        );
        let buffer = SecureBuffer::from_slice(&[5]);
        assert_eq!(buffer.clone().into_secure(), buffer);
    }
}
