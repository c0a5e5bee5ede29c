//! The canonical error value and the layer conversion trait.

use thiserror::Error;

use crate::detail;
use crate::kind::ErrorKind;

/// The single internal error representation.
///
/// `detail` is never empty: an empty reason is replaced by the kind's default
/// message. `retryable` defaults to [`ErrorKind::retryable_by_default`] and is
/// preserved by every layer translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct CanonicalError {
    kind: ErrorKind,
    detail: String,
    retryable: bool,
}

impl CanonicalError {
    /// Creates an error with the kind's default retry classification.
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let detail = if detail.is_empty() {
            kind.default_detail().to_string()
        } else {
            detail
        };

        Self {
            kind,
            detail,
            retryable: kind.retryable_by_default(),
        }
    }

    /// Creates an error that must not be retried.
    pub fn permanent(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::new(kind, detail).with_retryable(false)
    }

    /// Creates an error that may be retried.
    pub fn transient(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::new(kind, detail).with_retryable(true)
    }

    /// Creates an error whose detail carries structured fields.
    pub fn structured(kind: ErrorKind, tag: &str, fields: &[(&str, &str)]) -> Self {
        Self::new(kind, detail::encode(tag, fields))
    }

    /// Overrides the retry classification.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Shorthand for [`ErrorKind::InvalidInput`].
    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, detail)
    }

    /// Shorthand for a permanent [`ErrorKind::OperationNotSupported`] naming the operation.
    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::permanent(ErrorKind::OperationNotSupported, operation)
    }

    /// Shorthand for [`ErrorKind::InternalError`].
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, detail)
    }

    /// The error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The reason text.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Whether retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Whether the retry classification is the kind's default.
    pub fn has_default_retry(&self) -> bool {
        self.retryable == self.kind.retryable_by_default()
    }

    /// Parses structured fields carrying `tag` out of the detail.
    pub fn fields(&self, tag: &str) -> Option<detail::Structured> {
        detail::parse(&self.detail, tag)
    }

    /// Returns the text after `tag: ` in the detail.
    pub fn tagged_text(&self, tag: &str) -> Option<&str> {
        detail::strip_tag(&self.detail, tag)
    }
}

/// Conversion between a layer-specific error and [`CanonicalError`].
///
/// Both directions are total. For every canonical error `c`,
/// `E::from_canonical(&c).to_canonical() == c`.
pub trait Canonical: Sized {
    /// Converts this error into its canonical form.
    fn to_canonical(&self) -> CanonicalError;

    /// Rebuilds a layer error from a canonical one.
    fn from_canonical(error: &CanonicalError) -> Self;
}

impl Canonical for CanonicalError {
    fn to_canonical(&self) -> CanonicalError {
        self.clone()
    }

    fn from_canonical(error: &CanonicalError) -> Self {
        error.clone()
    }
}
