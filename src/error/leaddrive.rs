use axum::{Json, http::StatusCode, response::IntoResponse};
use leaddrive_schema::FailureBody;
use thiserror::Error as ThisError;
use tracing::{error, warn};

use super::drive::DriveError;

/// Failure of a lead Drive operation, rendered as `{success: false, message}`.
#[derive(Debug, ThisError)]
pub enum LeadDriveError {
    #[error("Lead {0} not found")]
    LeadNotFound(i64),

    #[error("Folder already exists for this lead")]
    AlreadyExists { folder_url: Option<String> },

    #[error("Folder has already been moved to Projects")]
    AlreadyMoved,

    #[error("Lead has not reached the won stage")]
    NotWon,

    #[error("No folder exists for this lead")]
    NotProvisioned,

    #[error("{0}")]
    Validation(String),

    #[error("Drive request failed: {0}")]
    Remote(#[from] DriveError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl LeadDriveError {
    pub fn status(&self) -> StatusCode {
        match self {
            LeadDriveError::LeadNotFound(_) => StatusCode::NOT_FOUND,
            LeadDriveError::AlreadyExists { .. }
            | LeadDriveError::AlreadyMoved
            | LeadDriveError::NotWon
            | LeadDriveError::NotProvisioned => StatusCode::BAD_REQUEST,
            LeadDriveError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LeadDriveError::Remote(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            LeadDriveError::Remote(_) => StatusCode::BAD_GATEWAY,
            LeadDriveError::DatabaseError(_) | LeadDriveError::RactorError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LeadDriveError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match self {
            LeadDriveError::AlreadyExists { ref folder_url } => FailureBody {
                folder_url: folder_url.clone(),
                ..FailureBody::new(self.to_string())
            },
            LeadDriveError::Remote(ref e) => {
                warn!(error = %e, "Drive gateway failure");
                FailureBody::new(self.to_string())
            }
            LeadDriveError::DatabaseError(_) | LeadDriveError::RactorError(_) => {
                error!(error = %self, "Lead drive internal failure");
                FailureBody::new("An internal server error occurred.")
            }
            _ => FailureBody::new(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_documented_statuses() {
        assert_eq!(LeadDriveError::LeadNotFound(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            LeadDriveError::AlreadyExists { folder_url: None }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(LeadDriveError::NotProvisioned.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            LeadDriveError::Validation("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            LeadDriveError::Remote(DriveError::Unexpected("boom".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            LeadDriveError::RactorError("gone".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
