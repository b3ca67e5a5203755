use super::{Result, SourceError};

/// Status and body of an upstream HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Returns the body of a 2xx response, or an `Upstream` error otherwise.
pub fn check_status(response: HttpResponse) -> Result<String> {
    if (200..300).contains(&response.status) {
        Ok(response.body)
    } else {
        Err(SourceError::Upstream {
            status: response.status,
            message: extract_error_message(&response.body),
        })
    }
}

/// Best-effort message from an error body: JSON bodies are kept as they are,
/// HTML pages yield their `<title>`, anything else is returned trimmed.
pub fn extract_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return trimmed.to_string();
    }
    html_title(trimmed).unwrap_or(trimmed).to_string()
}

fn html_title(body: &str) -> Option<&str> {
    let start = body.find("<title>")? + "<title>".len();
    let len = body[start..].find("</title>")?;
    let title = body[start..start + len].trim();
    (!title.is_empty()).then_some(title)
}
