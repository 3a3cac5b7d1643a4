pub mod drive;
pub mod leads;

pub use drive::{DriveFile, DriveFileList, DriveFileMetadata, FOLDER_MIME_TYPE};
pub use leads::{
    CreateFolderResponse, CreateProjectRequest, CreateProjectResponse, CreatedProject,
    DeleteFileRequest, DriveStatusResponse, FailureBody, FileEntry, FileListResponse,
    LeadDriveStatus, LeadUpsertRequest, MessageResponse, ProjectListResponse, ProjectRow,
    UploadResponse, UploadedFile,
};
