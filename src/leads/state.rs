use crate::db::DbLead;

/// Lifecycle of a lead's Drive folder, derived from the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderState {
    NoFolder,
    FolderCreated,
    MovedToProjects,
}

impl FolderState {
    pub fn of(lead: &DbLead) -> Self {
        match (&lead.google_drive_folder_id, lead.folder_moved_at) {
            (None, _) => FolderState::NoFolder,
            (Some(_), None) => FolderState::FolderCreated,
            (Some(_), Some(_)) => FolderState::MovedToProjects,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FolderState::NoFolder => "no_folder",
            FolderState::FolderCreated => "folder_created",
            FolderState::MovedToProjects => "moved_to_projects",
        }
    }
}

/// A lead is won when no won stage is configured or its stage matches.
pub fn is_won(lead: &DbLead, won_stage_id: Option<i64>) -> bool {
    won_stage_id.is_none_or(|won| lead.pipeline_stage_id == Some(won))
}

/// Whether `move_to_projects` would currently succeed, ignoring remote failures.
pub fn can_move(lead: &DbLead, won_stage_id: Option<i64>) -> bool {
    FolderState::of(lead) == FolderState::FolderCreated && is_won(lead, won_stage_id)
}
