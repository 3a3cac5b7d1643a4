//! Drive gateway: the remote folder/file capability consumed by the lead services.

mod auth;
mod client;

pub use auth::{DriveCredential, DriveTokenSource};
pub use client::GoogleDriveClient;

use crate::error::DriveError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leaddrive_schema::{DriveFile, FileEntry};

/// Canonical browser URL of a Drive folder.
pub fn folder_url(folder_id: &str) -> String {
    format!("https://drive.google.com/drive/folders/{folder_id}")
}

/// Id and viewable URL of a remote object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveLink {
    pub id: String,
    pub url: String,
}

/// A child of a folder as returned by `list_children`.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub is_folder: bool,
    pub size: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl From<DriveFile> for DriveEntry {
    fn from(file: DriveFile) -> Self {
        let is_folder = file.is_folder();
        Self {
            name: file.name.unwrap_or_default(),
            mime_type: file.mime_type.unwrap_or_default(),
            is_folder,
            size: file.size,
            created_at: file.created_time,
            modified_at: file.modified_time,
            url: file.web_view_link,
            thumbnail_url: file.thumbnail_link,
            id: file.id,
        }
    }
}

impl From<DriveEntry> for FileEntry {
    fn from(entry: DriveEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            mime_type: entry.mime_type,
            size: entry.size,
            created_time: entry.created_at,
            modified_time: entry.modified_at,
            url: entry.url,
            thumbnail: entry.thumbnail_url,
            is_folder: entry.is_folder,
        }
    }
}

/// File content to place in a folder.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub parent_id: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// Remote folder/file operations. Implementations surface every failure as one
/// [`DriveError`] and never retry mutations.
#[async_trait]
pub trait DriveGateway: Send + Sync {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<DriveLink, DriveError>;

    /// Add `new_parent_id` and remove `old_parent_id` in one update.
    async fn move_folder(
        &self,
        folder_id: &str,
        new_parent_id: &str,
        old_parent_id: &str,
    ) -> Result<(), DriveError>;

    /// Non-trashed children, folders first, then by name.
    async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveEntry>, DriveError>;

    async fn create_file(&self, upload: FileUpload) -> Result<DriveLink, DriveError>;

    async fn delete_file(&self, file_id: &str) -> Result<(), DriveError>;

    /// First non-trashed folder named exactly `name` directly under `parent_id`.
    async fn find_folder_by_exact_name(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<Option<DriveLink>, DriveError>;
}
