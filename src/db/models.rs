use chrono::{DateTime, Utc};
use leaddrive_schema::ProjectRow;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lead snapshot joined with its Drive record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbLead {
    pub id: i64,
    pub title: String,
    pub person_name: Option<String>,
    pub pipeline_stage_id: Option<i64>,
    pub client_number: Option<i64>,
    pub google_drive_folder_id: Option<String>,
    pub google_drive_folder_url: Option<String>,
    pub folder_created_at: Option<DateTime<Utc>>,
    pub folder_moved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbProject {
    pub id: i64,
    pub lead_id: i64,
    pub project_number: i64,
    pub project_name: String,
    pub google_drive_folder_id: Option<String>,
    pub google_drive_folder_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbProject> for ProjectRow {
    fn from(p: DbProject) -> Self {
        Self {
            id: p.id,
            lead_id: p.lead_id,
            project_number: p.project_number,
            project_name: p.project_name,
            google_drive_folder_id: p.google_drive_folder_id,
            google_drive_folder_url: p.google_drive_folder_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
