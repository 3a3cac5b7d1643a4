use crate::db::DbActorHandle;
use crate::error::LeadDriveError;
use tracing::info;

/// Hands out client numbers from the persisted counter.
#[derive(Clone)]
pub struct ClientNumberAllocator {
    db: DbActorHandle,
    seed: i64,
}

impl ClientNumberAllocator {
    pub fn new(db: DbActorHandle, seed: i64) -> Self {
        Self { db, seed }
    }

    /// Next unused number. Numbers are never handed out twice, even if the caller
    /// later fails.
    pub async fn allocate(&self) -> Result<i64, LeadDriveError> {
        let number = self.db.allocate_client_number(self.seed).await?;
        info!(client_number = number, "Client number allocated");
        Ok(number)
    }
}
