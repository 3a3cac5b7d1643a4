//! JSON payloads of the `/leads/{id}` HTTP surface.

mod requests;
mod responses;

pub use requests::{CreateProjectRequest, DeleteFileRequest, LeadUpsertRequest};
pub use responses::{
    CreateFolderResponse, CreateProjectResponse, CreatedProject, DriveStatusResponse, FailureBody,
    FileEntry, FileListResponse, LeadDriveStatus, MessageResponse, ProjectListResponse, ProjectRow,
    UploadResponse, UploadedFile,
};
