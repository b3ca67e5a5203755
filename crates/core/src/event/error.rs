use thiserror::Error;

/// Errors raised when an event filter describes an impossible query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange { from: String, to: String },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },
}

/// Errors raised when an upstream record cannot become an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Event is missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}
