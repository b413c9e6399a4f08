use thiserror::Error;

/// A failed "request more items" or "refresh" callback.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("load rejected: {0}")]
    Rejected(String),
}
