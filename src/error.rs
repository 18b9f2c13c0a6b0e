//! Error handling

use axum::response::IntoResponse;
use tracing::info;

/// Error definitions for the copyforge application.
#[derive(Debug)]
pub enum CopyforgeError {
    /// Missing credential or required identifier
    Configuration(String),
    /// The completion service failed or returned nothing usable
    Generation(String),
    /// An action was triggered without what it needs (selection, brief, ...)
    Precondition(String),
    /// When you didn't do the right thing
    BadRequest,
    /// Missing or invalid session
    Unauthorized,
    /// When a requested resource is not found
    NotFound(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl std::fmt::Display for CopyforgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "Configuration error: {message}"),
            Self::Generation(message) => write!(f, "Error generating variants: {message}"),
            Self::Precondition(message) => write!(f, "{message}"),
            Self::BadRequest => write!(f, "Bad request"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid or missing session."),
            Self::NotFound(what) => write!(f, "Not found: {what}"),
            Self::InternalServerError(message) => write!(f, "Internal server error: {message}"),
        }
    }
}

impl std::error::Error for CopyforgeError {}

impl From<std::io::Error> for CopyforgeError {
    fn from(err: std::io::Error) -> Self {
        CopyforgeError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for CopyforgeError {
    fn from(err: axum::http::Error) -> Self {
        CopyforgeError::InternalServerError(err.to_string())
    }
}

impl From<url::ParseError> for CopyforgeError {
    fn from(err: url::ParseError) -> Self {
        CopyforgeError::Configuration(err.to_string())
    }
}

impl IntoResponse for CopyforgeError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            CopyforgeError::BadRequest | CopyforgeError::Precondition(_) => {
                info!("Bad request received: {}", self);
                axum::http::StatusCode::BAD_REQUEST
            }
            CopyforgeError::Unauthorized => {
                info!("Unauthorized request received");
                axum::http::StatusCode::UNAUTHORIZED
            }
            CopyforgeError::NotFound(what) => {
                tracing::error!("404 {what}");
                axum::http::StatusCode::NOT_FOUND
            }
            CopyforgeError::Configuration(_) => {
                tracing::error!("{}", self);
                axum::http::StatusCode::SERVICE_UNAVAILABLE
            }
            CopyforgeError::Generation(_) => {
                tracing::error!("{}", self);
                axum::http::StatusCode::BAD_GATEWAY
            }
            CopyforgeError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = match &self {
            CopyforgeError::InternalServerError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let mut response = axum::response::Response::new(axum::body::Body::from(body));
        *response.status_mut() = status;
        response
    }
}
