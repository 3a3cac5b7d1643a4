use super::extract::{LeadId, LeadJson, read_upload};
use crate::error::LeadDriveError;
use crate::leads::LeadDriveService;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use leaddrive_schema::{
    CreateFolderResponse, CreateProjectRequest, CreateProjectResponse, CreatedProject,
    DeleteFileRequest, DriveStatusResponse, FileEntry, FileListResponse, LeadUpsertRequest,
    MessageResponse, ProjectListResponse, UploadResponse, UploadedFile,
};
use std::sync::Arc;

type Service = State<Arc<LeadDriveService>>;

pub async fn create_folder(
    State(service): Service,
    LeadId(lead_id): LeadId,
) -> Result<Json<CreateFolderResponse>, LeadDriveError> {
    let provisioned = service.provision_folder(lead_id).await?;
    let message = if provisioned.created {
        "Folder created successfully"
    } else {
        "Existing folder linked successfully"
    };
    Ok(Json(CreateFolderResponse {
        success: true,
        message: message.to_string(),
        folder_id: provisioned.folder.id,
        folder_url: provisioned.folder.url,
        client_number: provisioned.client_number,
        new_title: provisioned.title,
    }))
}

pub async fn move_to_projects(
    State(service): Service,
    LeadId(lead_id): LeadId,
) -> Result<Json<MessageResponse>, LeadDriveError> {
    service.move_to_projects(lead_id).await?;
    Ok(Json(MessageResponse::ok("Folder moved to Projects successfully")))
}

/// A lead without a folder still answers 200, with `success: false` and no files.
pub async fn list_files(
    State(service): Service,
    LeadId(lead_id): LeadId,
) -> Result<Json<FileListResponse>, LeadDriveError> {
    let response = match service.list_files(lead_id).await? {
        Some(entries) => FileListResponse {
            success: true,
            message: None,
            files: entries.into_iter().map(FileEntry::from).collect(),
        },
        None => FileListResponse {
            success: false,
            message: Some(LeadDriveError::NotProvisioned.to_string()),
            files: Vec::new(),
        },
    };
    Ok(Json(response))
}

/// The lead and its folder are checked before the multipart body is read.
pub async fn upload_file(
    State(service): Service,
    LeadId(lead_id): LeadId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, LeadDriveError> {
    service.require_folder(lead_id).await?;
    let file = read_upload(multipart).await?;
    let link = service.upload_file(lead_id, file).await?;
    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded successfully".to_string(),
        file: UploadedFile {
            id: link.id,
            url: link.url,
        },
    }))
}

pub async fn delete_file(
    State(service): Service,
    LeadId(lead_id): LeadId,
    LeadJson(body): LeadJson<DeleteFileRequest>,
) -> Result<Json<MessageResponse>, LeadDriveError> {
    service
        .delete_file(lead_id, body.file_id.as_deref())
        .await?;
    Ok(Json(MessageResponse::ok("File deleted successfully")))
}

pub async fn list_projects(
    State(service): Service,
    LeadId(lead_id): LeadId,
) -> Result<Json<ProjectListResponse>, LeadDriveError> {
    let projects = service.list_projects(lead_id).await?;
    Ok(Json(ProjectListResponse {
        success: true,
        projects: projects.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create_project(
    State(service): Service,
    LeadId(lead_id): LeadId,
    LeadJson(body): LeadJson<CreateProjectRequest>,
) -> Result<Json<CreateProjectResponse>, LeadDriveError> {
    let project = service
        .create_project(lead_id, body.project_name.as_deref())
        .await?;
    Ok(Json(CreateProjectResponse {
        success: true,
        message: "Project created successfully".to_string(),
        project: CreatedProject {
            id: project.id,
            project_number: project.project_number,
            project_name: project.project_name,
            folder_id: project.google_drive_folder_id.unwrap_or_default(),
            folder_url: project.google_drive_folder_url.unwrap_or_default(),
        },
    }))
}

pub async fn drive_status(
    State(service): Service,
    LeadId(lead_id): LeadId,
) -> Result<Json<DriveStatusResponse>, LeadDriveError> {
    let lead = service.drive_status(lead_id).await?;
    Ok(Json(DriveStatusResponse {
        success: true,
        lead,
    }))
}

pub async fn upsert_lead(
    State(service): Service,
    LeadId(lead_id): LeadId,
    LeadJson(body): LeadJson<LeadUpsertRequest>,
) -> Result<Json<MessageResponse>, LeadDriveError> {
    service.upsert_lead(lead_id, body).await?;
    Ok(Json(MessageResponse::ok("Lead saved")))
}

pub async fn delete_lead(
    State(service): Service,
    LeadId(lead_id): LeadId,
) -> Result<Json<MessageResponse>, LeadDriveError> {
    service.delete_lead(lead_id).await?;
    Ok(Json(MessageResponse::ok("Lead deleted")))
}
