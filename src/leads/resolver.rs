use crate::drive::{DriveGateway, DriveLink};
use crate::error::DriveError;
use crate::utils::KeyedLocks;
use std::sync::Arc;
use tracing::{debug, info};

/// Idempotent find-or-create of a named folder under a parent.
#[derive(Clone)]
pub struct FolderResolver {
    gateway: Arc<dyn DriveGateway>,
    locks: KeyedLocks<(String, String)>,
}

impl FolderResolver {
    pub fn new(gateway: Arc<dyn DriveGateway>) -> Self {
        Self {
            gateway,
            locks: KeyedLocks::new(),
        }
    }

    /// Returns the existing folder named `name` under `parent_id`, creating it if absent.
    /// The flag is `true` when this call created the folder.
    ///
    /// Calls for the same `(name, parent_id)` run one at a time, so concurrent callers
    /// observe a single folder.
    pub async fn resolve_or_create(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<(DriveLink, bool), DriveError> {
        let _guard = self
            .locks
            .lock((name.to_string(), parent_id.to_string()))
            .await;

        if let Some(existing) = self.gateway.find_folder_by_exact_name(name, parent_id).await? {
            debug!(folder_id = %existing.id, name, parent_id, "Reusing existing folder");
            return Ok((existing, false));
        }

        let created = self.gateway.create_folder(name, parent_id).await?;
        info!(folder_id = %created.id, name, parent_id, "Folder created");
        Ok((created, true))
    }
}
