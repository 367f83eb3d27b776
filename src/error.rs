//! Error types for the section host

use thiserror::Error;

/// Failure fetching a markup or data resource
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Request never produced a response (offline, CORS, aborted)
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} {status_text} for {path}")]
    Status {
        path: String,
        status: u16,
        status_text: String,
    },

    /// Response body could not be read as text
    #[error("could not read body of {0}")]
    Body(String),
}

/// Failure locating or running a section's behavior
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BehaviorError {
    /// No initializer registered for the section (expected for static sections)
    #[error("no behavior registered for section {0}")]
    NotRegistered(String),

    /// Initializer ran and reported a failure
    #[error("section {section} failed to initialize: {reason}")]
    Init { section: String, reason: String },
}

impl BehaviorError {
    /// Whether this error only means "nothing to run"
    pub fn is_missing(&self) -> bool {
        matches!(self, BehaviorError::NotRegistered(_))
    }
}

/// Failure talking to durable storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is disabled or not present (private mode, sandboxed iframe)
    #[error("storage unavailable")]
    Unavailable,

    /// Write rejected (quota exceeded)
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

/// Failure interpreting a cross-document message
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("malformed message: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("empty section id")]
    EmptySection,
}

/// Failure loading the card catalog or trivia
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
