use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Body of every failed operation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FailureBody {
    pub success: bool,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_url: Option<String>,
}

impl FailureBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            folder_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CreateFolderResponse {
    pub success: bool,
    pub message: String,
    pub folder_id: String,
    pub folder_url: String,
    pub client_number: i64,
    pub new_title: String,
}

/// One child of a lead folder, in the shape the view layer renders.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub thumbnail: Option<String>,
    pub is_folder: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FileListResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UploadedFile {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub file: UploadedFile,
}

/// A `lead_projects` row as stored.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProjectRow {
    pub id: i64,
    pub lead_id: i64,
    pub project_number: i64,
    pub project_name: String,
    pub google_drive_folder_id: Option<String>,
    pub google_drive_folder_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProjectListResponse {
    pub success: bool,
    pub projects: Vec<ProjectRow>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CreatedProject {
    pub id: i64,
    pub project_number: i64,
    pub project_name: String,
    pub folder_id: String,
    pub folder_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CreateProjectResponse {
    pub success: bool,
    pub message: String,
    pub project: CreatedProject,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LeadDriveStatus {
    pub lead_id: i64,
    pub title: String,
    pub person_name: Option<String>,
    pub pipeline_stage_id: Option<i64>,
    pub client_number: Option<i64>,
    /// Zero-padded presentation of `client_number`.
    pub client_number_display: Option<String>,
    pub google_drive_folder_id: Option<String>,
    pub google_drive_folder_url: Option<String>,
    pub folder_created_at: Option<DateTime<Utc>>,
    pub folder_moved_at: Option<DateTime<Utc>>,
    /// `no_folder`, `folder_created` or `moved_to_projects`.
    pub state: String,
    pub can_move: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DriveStatusResponse {
    pub success: bool,
    pub lead: LeadDriveStatus,
}
