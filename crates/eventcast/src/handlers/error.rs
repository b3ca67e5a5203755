use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventcast_core::event::{filter_error_to_status_code, FilterError};
use eventcast_core::source::{source_error_to_status_code, SourceError};

pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = if let Some(source_error) = self.0.downcast_ref::<SourceError>() {
            Some(source_error_to_status_code(source_error))
        } else {
            self.0
                .downcast_ref::<FilterError>()
                .map(filter_error_to_status_code)
        };

        let status_code = code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(status = %status_code, error = %self.0, "Request failed");
        } else {
            tracing::warn!(status = %status_code, error = %self.0, "Request rejected");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_preserved() {
        let error = AppError::from(SourceError::Upstream {
            status: 403,
            message: "Forbidden".to_string(),
        });
        assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_filter_errors_are_bad_requests() {
        let error = AppError::from(FilterError::OutOfRange {
            field: "month",
            value: 13,
        });
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let error = AppError(anyhow::anyhow!("unexpected"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
