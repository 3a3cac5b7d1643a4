pub mod extract;
pub mod handlers;

use crate::server::router::LeadDriveState;
use handlers::{
    create_folder, create_project, delete_file, delete_lead, drive_status, list_files,
    list_projects, move_to_projects, upload_file, upsert_lead,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn router(max_upload_bytes: usize) -> Router<LeadDriveState> {
    let upload_limit = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/leads/{id}", put(upsert_lead).delete(delete_lead))
        .route("/leads/{id}/drive", get(drive_status))
        .route("/leads/{id}/drive/create-folder", post(create_folder))
        .route("/leads/{id}/drive/move-to-projects", post(move_to_projects))
        .route("/leads/{id}/drive/files", get(list_files).delete(delete_file))
        .route(
            "/leads/{id}/drive/upload",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/leads/{id}/drive/projects",
            get(list_projects).post(create_project),
        )
}
