use thiserror::Error;

/// A configuration problem detected while building a [`crate::Listview`].
///
/// These are never fatal: the control logs them and skips the dependent feature.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no item template configured")]
    MissingItemTemplate,
    #[error("template `{0}` is not registered with the host")]
    UnknownTemplate(String),
    #[error("invalid orientation `{0}`, expected `vertical` or `horizontal`")]
    InvalidOrientation(String),
    #[error("invalid loading mode `{0}`, expected `infinite` or `incremental`")]
    InvalidLoading(String),
    #[error("`{option}` is enabled but no callback is configured")]
    MissingCallback { option: &'static str },
    #[error("callback `{0}` could not be found")]
    UnknownCallback(String),
    #[error("context for group {group:?} is not an array")]
    ContextNotArray { group: Option<String> },
}

/// A failed template bind reported by the host.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("template `{0}` not found")]
    TemplateNotFound(String),
    #[error("bind rejected: {0}")]
    Rejected(String),
}
