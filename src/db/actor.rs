use crate::db::CLIENT_NUMBER_KEY;
use crate::db::models::{DbLead, DbProject};
use crate::db::patch::{ClientNumberAssign, FolderLink, FolderMove, LeadUpsert, ProjectCreate};
use crate::db::schema::SQLITE_INIT;
use crate::error::LeadDriveError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert or refresh a lead snapshot.
    UpsertLead(LeadUpsert, RpcReplyPort<Result<(), LeadDriveError>>),

    /// Delete a lead; its Drive record and projects cascade. Replies whether a row was removed.
    DeleteLead(i64, RpcReplyPort<Result<bool, LeadDriveError>>),

    /// Lead snapshot joined with its Drive record.
    GetLead(i64, RpcReplyPort<Result<Option<DbLead>, LeadDriveError>>),

    /// Hand out the next client number, creating the counter at the given seed.
    AllocateClientNumber(i64, RpcReplyPort<Result<i64, LeadDriveError>>),

    /// Set the lead's client number if unset; replies with the effective number.
    AssignClientNumber(ClientNumberAssign, RpcReplyPort<Result<i64, LeadDriveError>>),

    /// Record the lead folder and retitle the lead (single transaction).
    LinkFolder(FolderLink, RpcReplyPort<Result<(), LeadDriveError>>),

    /// Stamp `folder_moved_at`.
    MarkMoved(FolderMove, RpcReplyPort<Result<(), LeadDriveError>>),

    /// `max(project_number) + 1` for the lead, or 1.
    NextProjectNumber(i64, RpcReplyPort<Result<i64, LeadDriveError>>),

    CreateProject(ProjectCreate, RpcReplyPort<Result<DbProject, LeadDriveError>>),

    /// Projects of a lead ordered by `project_number`.
    ListProjects(i64, RpcReplyPort<Result<Vec<DbProject>, LeadDriveError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn upsert_lead(&self, lead: LeadUpsert) -> Result<(), LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::UpsertLead, lead).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor UpsertLead RPC failed: {e}"))
        })?
    }

    pub async fn delete_lead(&self, lead_id: i64) -> Result<bool, LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::DeleteLead, lead_id).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor DeleteLead RPC failed: {e}"))
        })?
    }

    pub async fn get_lead(&self, lead_id: i64) -> Result<Option<DbLead>, LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::GetLead, lead_id)
            .map_err(|e| LeadDriveError::RactorError(format!("DbActor GetLead RPC failed: {e}")))?
    }

    pub async fn allocate_client_number(&self, seed: i64) -> Result<i64, LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::AllocateClientNumber, seed).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor AllocateClientNumber RPC failed: {e}"))
        })?
    }

    pub async fn assign_client_number(
        &self,
        assign: ClientNumberAssign,
    ) -> Result<i64, LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::AssignClientNumber, assign).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor AssignClientNumber RPC failed: {e}"))
        })?
    }

    pub async fn link_folder(&self, link: FolderLink) -> Result<(), LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::LinkFolder, link).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor LinkFolder RPC failed: {e}"))
        })?
    }

    pub async fn mark_moved(&self, moved: FolderMove) -> Result<(), LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::MarkMoved, moved).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor MarkMoved RPC failed: {e}"))
        })?
    }

    pub async fn next_project_number(&self, lead_id: i64) -> Result<i64, LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::NextProjectNumber, lead_id).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor NextProjectNumber RPC failed: {e}"))
        })?
    }

    pub async fn create_project(&self, create: ProjectCreate) -> Result<DbProject, LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::CreateProject, create).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor CreateProject RPC failed: {e}"))
        })?
    }

    pub async fn list_projects(&self, lead_id: i64) -> Result<Vec<DbProject>, LeadDriveError> {
        ractor::call!(self.actor, DbActorMessage::ListProjects, lead_id).map_err(|e| {
            LeadDriveError::RactorError(format!("DbActor ListProjects RPC failed: {e}"))
        })?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::UpsertLead(lead, reply) => {
                let _ = reply.send(upsert_lead(pool, lead).await);
            }
            DbActorMessage::DeleteLead(lead_id, reply) => {
                let _ = reply.send(delete_lead(pool, lead_id).await);
            }
            DbActorMessage::GetLead(lead_id, reply) => {
                let _ = reply.send(get_lead(pool, lead_id).await);
            }
            DbActorMessage::AllocateClientNumber(seed, reply) => {
                let _ = reply.send(allocate_client_number(pool, seed).await);
            }
            DbActorMessage::AssignClientNumber(assign, reply) => {
                let _ = reply.send(assign_client_number(pool, assign).await);
            }
            DbActorMessage::LinkFolder(link, reply) => {
                let _ = reply.send(link_folder(pool, link).await);
            }
            DbActorMessage::MarkMoved(moved, reply) => {
                let _ = reply.send(mark_moved(pool, moved).await);
            }
            DbActorMessage::NextProjectNumber(lead_id, reply) => {
                let _ = reply.send(next_project_number(pool, lead_id).await);
            }
            DbActorMessage::CreateProject(create, reply) => {
                let _ = reply.send(create_project(pool, create).await);
            }
            DbActorMessage::ListProjects(lead_id, reply) => {
                let _ = reply.send(list_projects(pool, lead_id).await);
            }
        }
        Ok(())
    }
}

async fn upsert_lead(pool: &SqlitePool, lead: LeadUpsert) -> Result<(), LeadDriveError> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO leads (id, title, person_name, pipeline_stage_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            person_name = excluded.person_name,
            pipeline_stage_id = excluded.pipeline_stage_id,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(lead.id)
    .bind(lead.title)
    .bind(lead.person_name)
    .bind(lead.pipeline_stage_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

async fn delete_lead(pool: &SqlitePool, lead_id: i64) -> Result<bool, LeadDriveError> {
    let res = sqlx::query("DELETE FROM leads WHERE id = ?")
        .bind(lead_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

async fn get_lead(pool: &SqlitePool, lead_id: i64) -> Result<Option<DbLead>, LeadDriveError> {
    let row = sqlx::query_as::<_, DbLead>(
        r#"
        SELECT l.id, l.title, l.person_name, l.pipeline_stage_id,
               d.client_number, d.google_drive_folder_id, d.google_drive_folder_url,
               d.folder_created_at, d.folder_moved_at
        FROM leads l
        LEFT JOIN lead_drive d ON d.lead_id = l.id
        WHERE l.id = ?
        "#,
    )
    .bind(lead_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Read and increment in one statement: the stored value is the next number to hand out,
/// so a fresh counter stores `seed + 1` and returns `seed`.
async fn allocate_client_number(pool: &SqlitePool, seed: i64) -> Result<i64, LeadDriveError> {
    let now = Utc::now();
    let number: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO system_settings (key, value, created_at, updated_at)
        VALUES (?, ? + 1, ?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value = system_settings.value + 1,
            updated_at = excluded.updated_at
        RETURNING value - 1
        "#,
    )
    .bind(CLIENT_NUMBER_KEY)
    .bind(seed)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    debug!(client_number = number, "client number allocated");
    Ok(number)
}

async fn assign_client_number(
    pool: &SqlitePool,
    assign: ClientNumberAssign,
) -> Result<i64, LeadDriveError> {
    let number: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO lead_drive (lead_id, client_number, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(lead_id) DO UPDATE SET
            client_number = COALESCE(lead_drive.client_number, excluded.client_number),
            updated_at = excluded.updated_at
        RETURNING client_number
        "#,
    )
    .bind(assign.lead_id)
    .bind(assign.client_number)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(number)
}

async fn link_folder(pool: &SqlitePool, link: FolderLink) -> Result<(), LeadDriveError> {
    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        r#"
        UPDATE lead_drive
        SET
            google_drive_folder_id = ?,
            google_drive_folder_url = ?,
            folder_created_at = COALESCE(folder_created_at, ?),
            updated_at = ?
        WHERE lead_id = ? AND client_number IS NOT NULL
        "#,
    )
    .bind(&link.folder_id)
    .bind(&link.folder_url)
    .bind(link.linked_at)
    .bind(link.linked_at)
    .bind(link.lead_id)
    .execute(&mut *tx)
    .await?;
    if res.rows_affected() == 0 {
        // A folder may only be linked once a client number is in place.
        return Err(sqlx::Error::RowNotFound.into());
    }

    sqlx::query("UPDATE leads SET title = ?, updated_at = ? WHERE id = ?")
        .bind(&link.title)
        .bind(link.linked_at)
        .bind(link.lead_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    debug!(
        lead_id = link.lead_id,
        folder_id = %link.folder_id,
        title = %link.title,
        "lead folder linked"
    );
    Ok(())
}

async fn mark_moved(pool: &SqlitePool, moved: FolderMove) -> Result<(), LeadDriveError> {
    let res = sqlx::query(
        r#"
        UPDATE lead_drive
        SET folder_moved_at = COALESCE(folder_moved_at, ?), updated_at = ?
        WHERE lead_id = ? AND google_drive_folder_id IS NOT NULL
        "#,
    )
    .bind(moved.moved_at)
    .bind(moved.moved_at)
    .bind(moved.lead_id)
    .execute(pool)
    .await?;
    if res.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound.into());
    }
    Ok(())
}

async fn next_project_number(pool: &SqlitePool, lead_id: i64) -> Result<i64, LeadDriveError> {
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(project_number), 0) + 1 FROM lead_projects WHERE lead_id = ?",
    )
    .bind(lead_id)
    .fetch_one(pool)
    .await?;
    Ok(next)
}

async fn create_project(
    pool: &SqlitePool,
    create: ProjectCreate,
) -> Result<DbProject, LeadDriveError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, DbProject>(
        r#"
        INSERT INTO lead_projects (
            lead_id, project_number, project_name, google_drive_folder_id,
            google_drive_folder_url, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, lead_id, project_number, project_name, google_drive_folder_id,
                  google_drive_folder_url, created_at, updated_at
        "#,
    )
    .bind(create.lead_id)
    .bind(create.project_number)
    .bind(create.project_name)
    .bind(create.folder_id)
    .bind(create.folder_url)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn list_projects(pool: &SqlitePool, lead_id: i64) -> Result<Vec<DbProject>, LeadDriveError> {
    let rows = sqlx::query_as::<_, DbProject>(
        r#"
        SELECT id, lead_id, project_number, project_name, google_drive_folder_id,
               google_drive_folder_url, created_at, updated_at
        FROM lead_projects
        WHERE lead_id = ?
        ORDER BY project_number
        "#,
    )
    .bind(lead_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, LeadDriveError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| LeadDriveError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), LeadDriveError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
