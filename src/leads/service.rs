use super::naming::{format_client_number, format_lead_folder_name, format_project_folder_name};
use super::numbering::ClientNumberAllocator;
use super::resolver::FolderResolver;
use super::state::{FolderState, can_move, is_won};
use crate::config::Config;
use crate::db::{
    ClientNumberAssign, DbActorHandle, DbLead, DbProject, FolderLink, FolderMove, LeadUpsert,
    ProjectCreate,
};
use crate::drive::{DriveEntry, DriveGateway, DriveLink, FileUpload};
use crate::error::LeadDriveError;
use crate::utils::KeyedLocks;
use chrono::Utc;
use leaddrive_schema::{LeadDriveStatus, LeadUpsertRequest};
use std::sync::Arc;
use tracing::{info, warn};

const MAX_PROJECT_NAME_CHARS: usize = 255;
const DEFAULT_UPLOAD_MIME_TYPE: &str = "application/octet-stream";

/// Settings of the lead workflow, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct LeadDriveSettings {
    pub leads_folder_id: String,
    pub projects_folder_id: String,
    pub won_stage_id: Option<i64>,
    pub numbering_seed: i64,
    pub display_width: usize,
    pub max_upload_bytes: usize,
}

impl From<&Config> for LeadDriveSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            leads_folder_id: cfg.drive.folders.leads.clone(),
            projects_folder_id: cfg.drive.folders.projects.clone(),
            won_stage_id: cfg.leads.won_stage_id,
            numbering_seed: cfg.numbering.seed,
            display_width: cfg.numbering.display_width,
            max_upload_bytes: cfg.leads.max_upload_bytes,
        }
    }
}

/// Result of provisioning a lead folder.
#[derive(Debug, Clone)]
pub struct ProvisionedFolder {
    pub folder: DriveLink,
    pub client_number: i64,
    pub title: String,
    /// `false` when an existing folder with the canonical name was linked instead.
    pub created: bool,
}

/// A file received from the client, before it is sent to Drive.
#[derive(Debug, Clone, Default)]
pub struct IncomingFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

/// Folder and file operations of a lead.
///
/// Provisioning, moving and project creation for one lead run one at a time.
#[derive(Clone)]
pub struct LeadDriveService {
    db: DbActorHandle,
    gateway: Arc<dyn DriveGateway>,
    resolver: FolderResolver,
    allocator: ClientNumberAllocator,
    lead_locks: KeyedLocks<i64>,
    settings: Arc<LeadDriveSettings>,
}

impl LeadDriveService {
    pub fn new(
        db: DbActorHandle,
        gateway: Arc<dyn DriveGateway>,
        settings: LeadDriveSettings,
    ) -> Self {
        Self {
            allocator: ClientNumberAllocator::new(db.clone(), settings.numbering_seed),
            resolver: FolderResolver::new(gateway.clone()),
            db,
            gateway,
            lead_locks: KeyedLocks::new(),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &LeadDriveSettings {
        &self.settings
    }

    async fn require_lead(&self, lead_id: i64) -> Result<DbLead, LeadDriveError> {
        self.db
            .get_lead(lead_id)
            .await?
            .ok_or(LeadDriveError::LeadNotFound(lead_id))
    }

    /// Folder id of an existing, provisioned lead.
    ///
    /// Callers run this before validating their own input, so an unknown lead answers
    /// `LeadNotFound` and a lead without a folder answers `NotProvisioned` first.
    pub async fn require_folder(&self, lead_id: i64) -> Result<String, LeadDriveError> {
        self.require_lead(lead_id)
            .await?
            .google_drive_folder_id
            .ok_or(LeadDriveError::NotProvisioned)
    }

    /// Creates (or links) the lead folder under the leads parent.
    ///
    /// The client number is persisted before any remote call, so a retry after a remote
    /// failure reuses it and resolves the same folder name.
    pub async fn provision_folder(&self, lead_id: i64) -> Result<ProvisionedFolder, LeadDriveError> {
        let _guard = self.lead_locks.lock(lead_id).await;
        let lead = self.require_lead(lead_id).await?;

        if lead.google_drive_folder_id.is_some() {
            return Err(LeadDriveError::AlreadyExists {
                folder_url: lead.google_drive_folder_url,
            });
        }

        let client_number = match lead.client_number {
            Some(number) => number,
            None => {
                let number = self.allocator.allocate().await?;
                self.db
                    .assign_client_number(ClientNumberAssign {
                        lead_id,
                        client_number: number,
                    })
                    .await?
            }
        };

        let title = format_lead_folder_name(client_number, lead.person_name.as_deref());
        let (folder, created) = self
            .resolver
            .resolve_or_create(&title, &self.settings.leads_folder_id)
            .await?;

        self.db
            .link_folder(FolderLink {
                lead_id,
                folder_id: folder.id.clone(),
                folder_url: folder.url.clone(),
                title: title.clone(),
                linked_at: Utc::now(),
            })
            .await?;

        info!(
            lead_id,
            client_number,
            folder_id = %folder.id,
            created,
            "Lead folder provisioned"
        );
        Ok(ProvisionedFolder {
            folder,
            client_number,
            title,
            created,
        })
    }

    /// Moves the lead folder from the leads parent to the projects parent.
    pub async fn move_to_projects(&self, lead_id: i64) -> Result<(), LeadDriveError> {
        let _guard = self.lead_locks.lock(lead_id).await;
        let lead = self.require_lead(lead_id).await?;

        let folder_id = match (FolderState::of(&lead), &lead.google_drive_folder_id) {
            (FolderState::MovedToProjects, _) => return Err(LeadDriveError::AlreadyMoved),
            (FolderState::FolderCreated, Some(id)) => id.clone(),
            _ => return Err(LeadDriveError::NotProvisioned),
        };
        if !is_won(&lead, self.settings.won_stage_id) {
            return Err(LeadDriveError::NotWon);
        }

        self.gateway
            .move_folder(
                &folder_id,
                &self.settings.projects_folder_id,
                &self.settings.leads_folder_id,
            )
            .await?;
        self.db
            .mark_moved(FolderMove {
                lead_id,
                moved_at: Utc::now(),
            })
            .await?;

        info!(lead_id, folder_id = %folder_id, "Lead folder moved to projects");
        Ok(())
    }

    /// Children of the lead folder, or `None` if the lead has no folder yet.
    pub async fn list_files(&self, lead_id: i64) -> Result<Option<Vec<DriveEntry>>, LeadDriveError> {
        let lead = self.require_lead(lead_id).await?;
        let Some(folder_id) = lead.google_drive_folder_id else {
            return Ok(None);
        };
        let entries = self.gateway.list_children(&folder_id).await?;
        Ok(Some(entries))
    }

    pub async fn upload_file(
        &self,
        lead_id: i64,
        file: IncomingFile,
    ) -> Result<DriveLink, LeadDriveError> {
        let folder_id = self.require_folder(lead_id).await?;

        if file.content.is_empty() {
            return Err(LeadDriveError::Validation("No file was uploaded".to_string()));
        }
        if file.content.len() > self.settings.max_upload_bytes {
            return Err(LeadDriveError::Validation(format!(
                "File exceeds the maximum size of {} bytes",
                self.settings.max_upload_bytes
            )));
        }

        let name = file
            .file_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "untitled".to_string());
        let mime_type = file
            .content_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_MIME_TYPE.to_string());

        let link = self
            .gateway
            .create_file(FileUpload {
                name,
                parent_id: folder_id,
                mime_type,
                content: file.content,
            })
            .await?;
        info!(lead_id, file_id = %link.id, "File uploaded to lead folder");
        Ok(link)
    }

    pub async fn delete_file(
        &self,
        lead_id: i64,
        file_id: Option<&str>,
    ) -> Result<(), LeadDriveError> {
        self.require_lead(lead_id).await?;
        let file_id = file_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| LeadDriveError::Validation("file_id is required".to_string()))?;

        self.gateway.delete_file(file_id).await?;
        info!(lead_id, file_id, "File deleted from Drive");
        Ok(())
    }

    pub async fn list_projects(&self, lead_id: i64) -> Result<Vec<DbProject>, LeadDriveError> {
        self.require_lead(lead_id).await?;
        self.db.list_projects(lead_id).await
    }

    /// Creates the next numbered project folder inside the lead folder.
    pub async fn create_project(
        &self,
        lead_id: i64,
        project_name: Option<&str>,
    ) -> Result<DbProject, LeadDriveError> {
        let _guard = self.lead_locks.lock(lead_id).await;
        let lead = self.require_lead(lead_id).await?;
        let (Some(lead_folder_id), Some(client_number)) =
            (lead.google_drive_folder_id, lead.client_number)
        else {
            return Err(LeadDriveError::NotProvisioned);
        };
        let project_name = validate_project_name(project_name)?;

        let project_number = self.db.next_project_number(lead_id).await?;
        let folder_name = format_project_folder_name(client_number, project_number, &project_name);
        let (folder, _) = self
            .resolver
            .resolve_or_create(&folder_name, &lead_folder_id)
            .await?;

        let project = self
            .db
            .create_project(ProjectCreate {
                lead_id,
                project_number,
                project_name,
                folder_id: folder.id,
                folder_url: folder.url,
            })
            .await?;

        info!(
            lead_id,
            project_number,
            project_id = project.id,
            "Project folder created"
        );
        Ok(project)
    }

    pub async fn upsert_lead(
        &self,
        lead_id: i64,
        snapshot: LeadUpsertRequest,
    ) -> Result<(), LeadDriveError> {
        if snapshot.title.trim().is_empty() {
            return Err(LeadDriveError::Validation("title is required".to_string()));
        }
        self.db
            .upsert_lead(LeadUpsert {
                id: lead_id,
                title: snapshot.title,
                person_name: snapshot.person_name,
                pipeline_stage_id: snapshot.pipeline_stage_id,
            })
            .await
    }

    /// Removes the lead with its Drive record and projects. Remote folders stay.
    pub async fn delete_lead(&self, lead_id: i64) -> Result<(), LeadDriveError> {
        let _guard = self.lead_locks.lock(lead_id).await;
        if !self.db.delete_lead(lead_id).await? {
            return Err(LeadDriveError::LeadNotFound(lead_id));
        }
        warn!(lead_id, "Lead deleted; its Drive folders were left in place");
        Ok(())
    }

    pub async fn drive_status(&self, lead_id: i64) -> Result<LeadDriveStatus, LeadDriveError> {
        let lead = self.require_lead(lead_id).await?;
        let state = FolderState::of(&lead);
        let can_move = can_move(&lead, self.settings.won_stage_id);
        Ok(LeadDriveStatus {
            lead_id: lead.id,
            client_number_display: lead
                .client_number
                .map(|n| format_client_number(n, self.settings.display_width)),
            title: lead.title,
            person_name: lead.person_name,
            pipeline_stage_id: lead.pipeline_stage_id,
            client_number: lead.client_number,
            google_drive_folder_id: lead.google_drive_folder_id,
            google_drive_folder_url: lead.google_drive_folder_url,
            folder_created_at: lead.folder_created_at,
            folder_moved_at: lead.folder_moved_at,
            state: state.as_str().to_string(),
            can_move,
        })
    }
}

fn validate_project_name(project_name: Option<&str>) -> Result<String, LeadDriveError> {
    let name = project_name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(LeadDriveError::Validation(
            "project_name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_PROJECT_NAME_CHARS {
        return Err(LeadDriveError::Validation(format!(
            "project_name must be at most {MAX_PROJECT_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}
