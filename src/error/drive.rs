use super::IsRetryable;
use super::oauth::OauthError;
use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Single failure signal of the Drive gateway.
#[derive(Debug, ThisError)]
pub enum DriveError {
    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("Drive request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status; `body` is a truncated preview for diagnostics.
    #[error("Drive upstream error with status {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error(transparent)]
    Oauth(#[from] OauthError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unexpected Drive response: {0}")]
    Unexpected(String),
}

impl DriveError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DriveError::UpstreamStatus { status, .. } if *status == StatusCode::NOT_FOUND
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            DriveError::UpstreamStatus { status, .. } if *status == StatusCode::UNAUTHORIZED
        )
    }
}

impl IsRetryable for DriveError {
    fn is_retryable(&self) -> bool {
        match self {
            DriveError::Request(_) => true,
            DriveError::UpstreamStatus { status, body } => {
                *status == StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error()
                    // Drive reports per-user quota bursts as 403 rateLimitExceeded.
                    || (*status == StatusCode::FORBIDDEN && body.contains("ateLimitExceeded"))
            }
            DriveError::Oauth(e) => e.is_retryable(),
            DriveError::Json(_) | DriveError::Url(_) | DriveError::Unexpected(_) => false,
        }
    }
}
