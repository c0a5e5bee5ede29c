//! Zero-on-drop container for sensitive bytes.
//!
//! A [`SecureBuffer`] has a fixed length for its whole life. Indexed access is
//! checked and reports [`BufferError::OutOfRange`] instead of panicking, and
//! the contents are wiped when the buffer is dropped.

use std::ops::Range;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::BufferError;

/// Opaque, fixed-length byte sequence for key, plaintext or ciphertext material.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecureBuffer {
    bytes: Box<[u8]>,
}

impl SecureBuffer {
    /// Takes ownership of the given bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }

    /// Creates a buffer of `len` zero bytes.
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    /// Copies the given slice into a new buffer.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    /// Number of bytes held.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the byte at `index`.
    pub fn get(&self, index: usize) -> Result<u8, BufferError> {
        self.bytes
            .get(index)
            .copied()
            .ok_or(BufferError::OutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Overwrites the byte at `index`.
    pub fn set(&mut self, index: usize, value: u8) -> Result<(), BufferError> {
        let len = self.len();
        let slot = self
            .bytes
            .get_mut(index)
            .ok_or(BufferError::OutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Copies a sub-range into a new buffer.
    pub fn slice(&self, range: Range<usize>) -> Result<SecureBuffer, BufferError> {
        let len = self.len();
        if range.start > range.end {
            return Err(BufferError::OutOfRange {
                index: range.start,
                len,
            });
        }
        self.bytes
            .get(range.clone())
            .map(SecureBuffer::from_slice)
            .ok_or(BufferError::OutOfRange {
                index: range.end,
                len,
            })
    }

    /// Overwrites the whole contents with `source`, which must have the same length.
    pub fn copy_from(&mut self, source: &[u8]) -> Result<(), BufferError> {
        if source.len() != self.len() {
            return Err(BufferError::LengthMismatch {
                expected: self.len(),
                actual: source.len(),
            });
        }
        self.bytes.copy_from_slice(source);
        Ok(())
    }

    /// Returns the raw bytes.
    ///
    /// Use with caution - copies made from the returned slice are not wiped.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Moves the bytes out into a vector that is wiped on drop.
    pub fn into_zeroizing(mut self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(std::mem::take(&mut self.bytes).into_vec())
    }

    /// Compares contents without short-circuiting on the first differing byte.
    pub fn ct_eq(&self, other: &[u8]) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.bytes
            .iter()
            .zip(other)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl PartialEq for SecureBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other.as_bytes())
    }
}

impl Eq for SecureBuffer {}

impl From<Vec<u8>> for SecureBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for SecureBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl From<Zeroizing<Vec<u8>>> for SecureBuffer {
    fn from(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self::from_slice(&bytes)
    }
}

impl std::fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBuffer")
            .field("len", &self.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_get_in_range() {
        let buffer = SecureBuffer::from_slice(&[1, 2, 3]);
        assert_eq!(buffer.get(0).unwrap(), 1);
        assert_eq!(buffer.get(2).unwrap(), 3);
    }

    #[test]
    fn test_get_out_of_range() {
        let buffer = SecureBuffer::from_slice(&[1, 2, 3]);
        assert_eq!(
            buffer.get(3),
            Err(BufferError::OutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_set_out_of_range() {
        let mut buffer = SecureBuffer::zeroed(2);
        assert!(buffer.set(1, 9).is_ok());
        assert_eq!(buffer.as_bytes(), &[0, 9]);
        assert!(matches!(
            buffer.set(2, 9),
            Err(BufferError::OutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_slice_bounds() {
        let buffer = SecureBuffer::from_slice(b"abcdef");
        assert_eq!(buffer.slice(1..3).unwrap().as_bytes(), b"bc");
        assert!(buffer.slice(4..9).is_err());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = buffer.slice(3..1);
        assert!(reversed.is_err());
    }

    #[test]
    fn test_copy_from_requires_same_length() {
        let mut buffer = SecureBuffer::zeroed(4);
        assert!(buffer.copy_from(&[1, 2, 3, 4]).is_ok());
        assert_eq!(
            buffer.copy_from(&[1]),
            Err(BufferError::LengthMismatch {
                expected: 4,
                actual: 1
            })
        );
    }

    #[test]
    fn test_zeroize_clears_contents() {
        let mut buffer = SecureBuffer::from_slice(&[0xAA; 16]);
        buffer.zeroize();
        assert!(buffer.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_debug_redacted() {
        let buffer = SecureBuffer::from_slice(b"super secret");
        let debug_str = format!("{:?}", buffer);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret"));
    }

    #[test]
    fn test_equality() {
        let a = SecureBuffer::from_slice(b"same");
        let b = SecureBuffer::from_slice(b"same");
        let c = SecureBuffer::from_slice(b"diff");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, SecureBuffer::from_slice(b"same-but-longer"));
    }

    #[test]
    fn test_into_zeroizing() {
        let buffer = SecureBuffer::from_slice(b"move me");
        let bytes = buffer.into_zeroizing();
        assert_eq!(&bytes[..], b"move me");
    }
}
