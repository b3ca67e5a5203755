use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The payload is neither a JSON object, a JSON array nor text.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    /// Cached content could not be parsed back into the expected structure.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_display() {
        let error = CacheError::ConnectionFailed("timeout".to_string());
        assert_eq!(error.to_string(), "Cache connection failed: timeout");
    }

    #[test]
    fn test_operation_failed_display() {
        let error = CacheError::OperationFailed("wrong type".to_string());
        assert_eq!(error.to_string(), "Cache operation failed: wrong type");
    }

    #[test]
    fn test_invalid_payload_display() {
        let error = CacheError::InvalidPayload("number".to_string());
        assert_eq!(error.to_string(), "Invalid payload: number");
    }

    #[test]
    fn test_decode_display() {
        let error = CacheError::Decode("expected array".to_string());
        assert_eq!(error.to_string(), "Decode error: expected array");
    }
}
