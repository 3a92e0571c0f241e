use thiserror::Error;

/// Column store failure.
///
/// `UnknownColumn` is the only error the in-memory store produces; the
/// `Backend` variant carries whatever a pluggable persistent engine
/// reports through the same surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown column {0}")]
    UnknownColumn(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

impl Error {
    pub fn backend(message: impl Into<String>) -> Self {
        Error::Backend(message.into())
    }
}
