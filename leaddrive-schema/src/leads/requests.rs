use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateProjectRequest {
    #[serde(default, alias = "projectName")]
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeleteFileRequest {
    #[serde(default, alias = "fileId")]
    pub file_id: Option<String>,
}

/// Lead snapshot pushed by the CRM.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeadUpsertRequest {
    pub title: String,

    #[serde(default, alias = "personName")]
    pub person_name: Option<String>,

    #[serde(default, alias = "pipelineStageId", alias = "lead_pipeline_stage_id")]
    pub pipeline_stage_id: Option<i64>,
}
