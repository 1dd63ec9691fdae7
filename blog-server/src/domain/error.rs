use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("post not found: {0}")]
    PostNotFound(String),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("forbidden: admin access required")]
    Forbidden,
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl DomainError {
    pub fn missing_field(field: &str) -> Self {
        DomainError::Validation(format!("{field} is required"))
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Upstream(format!("malformed document: {err}"))
    }
}

#[derive(Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::PostNotFound(_)
            | DomainError::CategoryNotFound(_)
            | DomainError::FileNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            DomainError::Upstream(detail) => {
                error!(detail = %detail, "upstream failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: message.as_str(),
        })
    }
}
