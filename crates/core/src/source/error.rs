use thiserror::Error;

/// Errors raised while fetching from an upstream source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The upstream answered with a non-success status.
    #[error("Upstream responded with {status}: {message}")]
    Upstream { status: u16, message: String },
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The upstream answered but the body could not be understood.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
