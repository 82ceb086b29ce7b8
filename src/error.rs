use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

/// Failure of a single transport call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to encode body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of a whole batch. The first failing request wins.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("URL path must not be empty")]
    EmptyUrl,

    #[error("Invalid HTTP method: '{0}'. Supported methods are: GET, POST, PUT, DELETE")]
    InvalidMethod(String),

    #[error("Body is not valid JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("Invalid resolver request: {0}")]
    BadRequest(String),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] TransportError),
}

impl ResponseError for ResolverError {
    fn status_code(&self) -> StatusCode {
        match self {
            ResolverError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ResolverError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
