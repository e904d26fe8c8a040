//! Error types for the blomplib library.

use thiserror::Error;

/// Main error type for blomplib operations.
///
/// Domain failures reported by the dashboard in the response body (anything
/// other than the literal `success`) are not errors: the mutating calls
/// return `false` for those.
#[derive(Error, Debug)]
pub enum BlompError {
    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Local I/O error (opening a download sink or an upload source).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unexpected response from server.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Login failed or the dashboard did not hand out a session context.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A named child could not be resolved.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied arguments are insufficient or malformed.
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// A file with the same name is already present in the cached listing.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Operation is not allowed on this node (e.g. renaming the root).
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Operation requested a state the node is already in.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Background upload or download failed.
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// The handle refers to a node dropped by a later reload.
    #[error("Stale node handle")]
    StaleNode,
}

/// Result type alias for blomplib operations.
pub type Result<T> = std::result::Result<T, BlompError>;
