//! Error types shared across the dispatch pipeline.
//!
//! Only [`FormatError`] (and an action the resource does not implement) ends a
//! request abnormally. Every other anomaly (unsupported verb, malformed body,
//! failed HTML render, rejected attachment name) degrades to a usable response
//! and never surfaces as an error value.

use crate::action::Action;

/// Fatal output formatting failure.
///
/// The formatter has already forced the response status to 500 by the time
/// one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// No renderer is registered under the requested format identifier.
    #[error("Unknown format method requested: {0}")]
    UnknownFormat(String),

    /// The crate was built without the `xml` feature.
    #[error("XML output is not available in this build")]
    XmlUnavailable,

    /// XML document could not be written (e.g. a key is not a valid element name).
    #[error("XML serialization failed: {0}")]
    Xml(String),

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// View lookup or rendering failure.
///
/// Never escapes the HTML renderer; it is logged and replaced by an empty body.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("view not found: {0}")]
    NotFound(String),

    #[error("invalid view name: {0}")]
    InvalidName(String),

    #[error("failed to read view: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("error view failed: {0}")]
    ErrorView(#[from] askama::Error),
}

/// Errors returned by [`RestController::execute`](crate::dispatcher::RestController::execute).
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The resource has no implementation for the resolved action.
    #[error("action '{0}' is not implemented by this resource")]
    ActionNotImplemented(Action),
}

impl RestError {
    /// Status code a transport layer should answer with for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RestError::Format(_) => 500,
            RestError::ActionNotImplemented(_) => 404,
        }
    }
}

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid format identifier '{0}': expected lower-case ASCII letters and digits")]
    InvalidFormat(String),
}
