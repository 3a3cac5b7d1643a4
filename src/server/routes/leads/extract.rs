use crate::error::LeadDriveError;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Multipart, Path, Request, multipart::MultipartRejection,
    },
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::leads::IncomingFile;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

/// Numeric `{id}` path segment.
pub struct LeadId(pub i64);

impl<S> FromRequestParts<S> for LeadId
where
    S: Send + Sync,
{
    type Rejection = LeadDriveError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(error = %rejection, "Rejected lead id");
                LeadDriveError::Validation("lead id must be an integer".to_string())
            })?;
        Ok(LeadId(id))
    }
}

/// JSON body whose rejections render as validation failures.
pub struct LeadJson<T>(pub T);

impl<S, T> FromRequest<S> for LeadJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = LeadDriveError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| LeadDriveError::Validation(rejection.body_text()))?;
        Ok(LeadJson(value))
    }
}

/// Reads the `file` field of a multipart upload. Other fields are ignored.
///
/// Takes the extraction result rather than extracting itself, so handlers can check
/// the lead before the body is read.
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<IncomingFile, LeadDriveError> {
    let mut multipart =
        multipart.map_err(|rejection| LeadDriveError::Validation(rejection.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_failure)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(multipart_failure)?;
        return Ok(IncomingFile {
            file_name,
            content_type,
            content: content.to_vec(),
        });
    }

    Err(LeadDriveError::Validation("No file was uploaded".to_string()))
}

fn multipart_failure(err: axum::extract::multipart::MultipartError) -> LeadDriveError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        LeadDriveError::Validation("File exceeds the maximum upload size".to_string())
    } else {
        LeadDriveError::Validation(err.body_text())
    }
}
