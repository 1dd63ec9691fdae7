use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },
    #[error("Token storage error: {0}")]
    TokenStorage(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl BlogClientError {
    /// Maps a non-success response onto an error, keeping the server's
    /// `{ "error": ... }` message when there is one.
    pub async fn from_http_response(resp: Response) -> Self {
        let status = resp.status();
        let message = match resp.text().await {
            Ok(text) => message_from_body(&text, status),
            Err(err) => return BlogClientError::RequestError(err),
        };
        Self::from_status(status, message)
    }

    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => BlogClientError::NotFound(message),
            StatusCode::UNAUTHORIZED => BlogClientError::Unauthorized,
            StatusCode::FORBIDDEN => BlogClientError::Forbidden(message),
            StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => {
                BlogClientError::InvalidRequest(message)
            }
            _ => BlogClientError::Server { status, message },
        }
    }
}

fn message_from_body(text: &str, status: StatusCode) -> String {
    serde_json::from_str::<ErrorBody>(text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            let text = text.trim();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_error_field_of_json_bodies() {
        let message = message_from_body(r#"{"error":"title is required"}"#, StatusCode::BAD_REQUEST);
        assert_eq!(message, "title is required");
    }

    #[test]
    fn falls_back_to_raw_text_then_reason_phrase() {
        assert_eq!(message_from_body("boom", StatusCode::BAD_GATEWAY), "boom");
        assert_eq!(message_from_body("  ", StatusCode::NOT_FOUND), "Not Found");
    }

    #[test]
    fn status_codes_map_to_variants() {
        assert!(matches!(
            BlogClientError::from_status(StatusCode::FORBIDDEN, "no".into()),
            BlogClientError::Forbidden(_)
        ));
        assert!(matches!(
            BlogClientError::from_status(StatusCode::BAD_REQUEST, "bad".into()),
            BlogClientError::InvalidRequest(_)
        ));
        assert!(matches!(
            BlogClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "x".into()),
            BlogClientError::Server { .. }
        ));
    }
}
