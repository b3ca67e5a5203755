//! Pure functions for mapping source errors to HTTP status codes.

use super::SourceError;

/// Maps a [`SourceError`] to an HTTP status code.
///
/// - `Upstream` -> the upstream status when it is a 4xx/5xx code, else 502
/// - `Transport` -> 502 (Bad Gateway)
/// - `InvalidResponse` -> 502 (Bad Gateway)
///
/// # Examples
///
/// ```
/// use eventcast_core::source::{source_error_to_status_code, SourceError};
///
/// let error = SourceError::Upstream { status: 403, message: "Forbidden".to_string() };
/// assert_eq!(source_error_to_status_code(&error), 403);
/// ```
pub fn source_error_to_status_code(error: &SourceError) -> u16 {
    match error {
        SourceError::Upstream { status, .. } if (400..=599).contains(status) => *status,
        SourceError::Upstream { .. } => 502,
        SourceError::Transport(_) => 502,
        SourceError::InvalidResponse(_) => 502,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16) -> SourceError {
        SourceError::Upstream {
            status,
            message: "error".to_string(),
        }
    }

    #[test]
    fn test_upstream_status_is_preserved() {
        assert_eq!(source_error_to_status_code(&upstream(403)), 403);
        assert_eq!(source_error_to_status_code(&upstream(404)), 404);
        assert_eq!(source_error_to_status_code(&upstream(503)), 503);
    }

    #[test]
    fn test_non_error_upstream_status_maps_to_502() {
        assert_eq!(source_error_to_status_code(&upstream(302)), 502);
        assert_eq!(source_error_to_status_code(&upstream(999)), 502);
    }

    #[test]
    fn test_transport_maps_to_502() {
        let error = SourceError::Transport("timeout".to_string());
        assert_eq!(source_error_to_status_code(&error), 502);
    }

    #[test]
    fn test_invalid_response_maps_to_502() {
        let error = SourceError::InvalidResponse("expected object".to_string());
        assert_eq!(source_error_to_status_code(&error), 502);
    }
}
