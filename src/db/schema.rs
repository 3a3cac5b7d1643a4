//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `system_settings` key/value table (holds the client number counter)
/// - `leads` table (lead snapshot pushed by the CRM)
/// - `lead_drive` table (one Drive record per lead)
/// - `lead_projects` table (one (lead_id, project_number) per row)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Settings (client number counter lives under key next_client_number)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS system_settings (
    key TEXT PRIMARY KEY NOT NULL,
    value INTEGER NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

-- ---------------------------------------------------------------------------
-- Lead snapshot
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS leads (
    id INTEGER PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    person_name TEXT NULL,
    pipeline_stage_id INTEGER NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

-- ---------------------------------------------------------------------------
-- Drive record (one row per lead)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS lead_drive (
    lead_id INTEGER PRIMARY KEY NOT NULL REFERENCES leads(id) ON DELETE CASCADE,
    client_number INTEGER NULL UNIQUE,
    google_drive_folder_id TEXT NULL,
    google_drive_folder_url TEXT NULL,
    folder_created_at TEXT NULL, -- RFC3339
    folder_moved_at TEXT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

-- ---------------------------------------------------------------------------
-- Projects (dense numbering per lead)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS lead_projects (
    id INTEGER PRIMARY KEY NOT NULL,
    lead_id INTEGER NOT NULL REFERENCES leads(id) ON DELETE CASCADE,
    project_number INTEGER NOT NULL,
    project_name TEXT NOT NULL,
    google_drive_folder_id TEXT NULL,
    google_drive_folder_url TEXT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(lead_id, project_number)
);

CREATE INDEX IF NOT EXISTS idx_lead_projects_lead ON lead_projects(lead_id)
"#;
