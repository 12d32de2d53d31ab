//! Error types for document operations and XML decoding.

use thiserror::Error;

/// Errors raised by [`Document`](crate::Document) operations and the decoder.
#[derive(Error, Debug)]
pub enum SonError {
    /// `delete` or `pop` on a key that is not present (and no default given).
    #[error("key not found: {0:?}")]
    KeyNotFound(String),

    /// `pop_item` on a document with no entries.
    #[error("container is empty")]
    EmptyContainer,

    /// Invalid call shape, e.g. more than one default passed to `pop`.
    #[error("argument error: {0}")]
    ArgumentError(String),

    /// The decoder met an element tag that has no decode rule.
    #[error("cannot parse tag: {0}")]
    UnsupportedTag(String),

    /// Element text could not be parsed as the scalar its tag requires.
    #[error("malformed <{tag}> value {text:?}: {reason}")]
    MalformedValue {
        tag: String,
        text: String,
        reason: String,
    },

    /// The element tree does not have the shape the grammar requires
    /// (missing `name` attribute, wrong child count, missing document root).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Element nesting went deeper than the configured limit.
    #[error("nesting depth exceeds limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// The bundled XML parser rejected the input text.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SonError {
    pub(crate) fn malformed(tag: &str, text: &str, reason: impl Into<String>) -> Self {
        SonError::MalformedValue {
            tag: tag.to_string(),
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<roxmltree::Error> for SonError {
    fn from(err: roxmltree::Error) -> Self {
        SonError::Xml(err.to_string())
    }
}

/// Convenience alias used throughout son-core.
pub type Result<T> = std::result::Result<T, SonError>;
