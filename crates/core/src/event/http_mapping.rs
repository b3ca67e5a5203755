//! Pure mapping from filter errors to HTTP status codes.

use super::FilterError;

/// Maps a [`FilterError`] to an HTTP status code. Every filter error is a
/// client error.
///
/// # Examples
///
/// ```
/// use eventcast_core::event::{filter_error_to_status_code, FilterError};
///
/// let error = FilterError::OutOfRange { field: "month", value: 13 };
/// assert_eq!(filter_error_to_status_code(&error), 400);
/// ```
pub fn filter_error_to_status_code(error: &FilterError) -> u16 {
    match error {
        FilterError::InvalidRange { .. } => 400,
        FilterError::OutOfRange { .. } => 400,
    }
}
