//! Error types shared by the upstream clients, the sampler and the HTTP layer

use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ProxyError {
    /// A credential required by the targeted upstream is not configured
    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    /// The upstream answered with a non-success status
    #[error("upstream responded with status {status}")]
    UpstreamTransport { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream body could not be parsed or lacks expected fields
    #[error("malformed upstream response: {0}")]
    UpstreamMalformed(String),

    #[error("attempt timed out after {0:?}")]
    AttemptTimeout(Duration),

    #[error("unsupported resource: {0}")]
    InvalidResource(String),
}

pub type ProxyResult<T> = Result<T, ProxyError>;

/// JSON body of every non-200 response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidResource(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to hand to callers. Upstream bodies stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::ConfigMissing(_) => "Server is missing API configuration".to_string(),
            Self::InvalidResource(resource) if resource.is_empty() => {
                "Missing resource parameter".to_string()
            }
            Self::InvalidResource(resource) => format!("Invalid resource: {resource}"),
            Self::UpstreamTransport { .. }
            | Self::Network(_)
            | Self::UpstreamMalformed(_)
            | Self::AttemptTimeout(_) => "Failed to reach the game catalog".to_string(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            Self::UpstreamTransport { status, body } => {
                error!("Upstream error {}: {}", status, body);
            }
            Self::InvalidResource(_) => warn!("{}", self),
            _ => error!("{}", self),
        }

        let status = self.status_code();
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_resource_maps_to_bad_request() {
        let err = ProxyError::InvalidResource("nope".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid resource: nope");
    }

    #[test]
    fn upstream_body_is_not_echoed() {
        let err = ProxyError::UpstreamTransport {
            status: 401,
            body: "{\"error\":\"Invalid API Key secret-123\"}".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("secret-123"));
    }

    #[test]
    fn config_missing_is_server_error() {
        let err = ProxyError::ConfigMissing("RAWG_API_KEY");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().is_empty());
    }
}
