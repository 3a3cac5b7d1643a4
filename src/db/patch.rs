//! Write payloads accepted by the database actor.

use chrono::{DateTime, Utc};

/// Lead snapshot pushed by the CRM.
#[derive(Debug, Clone, Default)]
pub struct LeadUpsert {
    pub id: i64,
    pub title: String,
    pub person_name: Option<String>,
    pub pipeline_stage_id: Option<i64>,
}

/// Assign a client number unless the lead already has one.
#[derive(Debug, Clone, Copy)]
pub struct ClientNumberAssign {
    pub lead_id: i64,
    pub client_number: i64,
}

/// Link a resolved folder to a lead and retitle the lead after it.
#[derive(Debug, Clone)]
pub struct FolderLink {
    pub lead_id: i64,
    pub folder_id: String,
    pub folder_url: String,
    pub title: String,
    pub linked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct FolderMove {
    pub lead_id: i64,
    pub moved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProjectCreate {
    pub lead_id: i64,
    pub project_number: i64,
    pub project_name: String,
    pub folder_id: String,
    pub folder_url: String,
}
