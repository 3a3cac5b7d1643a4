#![allow(dead_code)]

use async_trait::async_trait;
use leaddrive::config::Config;
use leaddrive::db::DbActorHandle;
use leaddrive::drive::{DriveEntry, DriveGateway, DriveLink, FileUpload, folder_url};
use leaddrive::error::DriveError;
use leaddrive::leads::{LeadDriveService, LeadDriveSettings};
use leaddrive_schema::FOLDER_MIME_TYPE;
use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

pub const LEADS_FOLDER: &str = "leads-parent";
pub const PROJECTS_FOLDER: &str = "projects-parent";

pub fn unique_sqlite_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "leaddrive-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

pub async fn spawn_db(prefix: &str) -> (DbActorHandle, PathBuf) {
    let path = unique_sqlite_path(prefix);
    let database_url = format!("sqlite:{}", path.display());
    let db = leaddrive::db::spawn(&database_url)
        .await
        .expect("db actor spawns");
    (db, path)
}

pub async fn cleanup(path: PathBuf) {
    let _ = tokio::fs::remove_file(&path).await;
    let _ = tokio::fs::remove_file(path.with_extension("sqlite-wal")).await;
    let _ = tokio::fs::remove_file(path.with_extension("sqlite-shm")).await;
}

pub fn test_settings() -> LeadDriveSettings {
    let mut cfg = Config::default();
    cfg.drive.folders.leads = LEADS_FOLDER.to_string();
    cfg.drive.folders.projects = PROJECTS_FOLDER.to_string();
    LeadDriveSettings::from(&cfg)
}

pub fn build_service(
    db: DbActorHandle,
    drive: Arc<MemoryDrive>,
    settings: LeadDriveSettings,
) -> LeadDriveService {
    let gateway: Arc<dyn DriveGateway> = drive;
    LeadDriveService::new(db, gateway, settings)
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub id: String,
    pub name: String,
    pub parents: Vec<String>,
    pub mime_type: String,
    pub size: usize,
}

/// In-memory Drive with per-operation call counters.
#[derive(Default)]
pub struct MemoryDrive {
    objects: Mutex<Vec<StoredObject>>,
    next_id: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub create_folder_calls: AtomicUsize,
    pub move_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub create_file_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    /// When set, every call fails with an upstream 503.
    pub fail_all: AtomicBool,
}

impl MemoryDrive {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn total_calls(&self) -> usize {
        [
            &self.find_calls,
            &self.create_folder_calls,
            &self.move_calls,
            &self.list_calls,
            &self.create_file_calls,
            &self.delete_calls,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<StoredObject> {
        self.objects().into_iter().find(|o| o.id == id)
    }

    pub fn folders_named(&self, name: &str, parent_id: &str) -> usize {
        self.objects()
            .iter()
            .filter(|o| o.name == name && o.parents.iter().any(|p| p == parent_id))
            .count()
    }

    /// Inserts a folder directly, bypassing the counters.
    pub fn seed_folder(&self, name: &str, parent_id: &str) -> String {
        self.insert(name, parent_id, FOLDER_MIME_TYPE, 0)
    }

    fn insert(&self, name: &str, parent_id: &str, mime_type: &str, size: usize) -> String {
        let id = format!("obj-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.objects.lock().unwrap().push(StoredObject {
            id: id.clone(),
            name: name.to_string(),
            parents: vec![parent_id.to_string()],
            mime_type: mime_type.to_string(),
            size,
        });
        id
    }

    fn check(&self) -> Result<(), DriveError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(DriveError::UpstreamStatus {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(id: &str) -> DriveError {
        DriveError::UpstreamStatus {
            status: reqwest::StatusCode::NOT_FOUND,
            body: format!("File not found: {id}"),
        }
    }
}

fn link(id: &str) -> DriveLink {
    DriveLink {
        id: id.to_string(),
        url: folder_url(id),
    }
}

#[async_trait]
impl DriveGateway for MemoryDrive {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<DriveLink, DriveError> {
        self.create_folder_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let id = self.insert(name, parent_id, FOLDER_MIME_TYPE, 0);
        Ok(link(&id))
    }

    async fn move_folder(
        &self,
        folder_id: &str,
        new_parent_id: &str,
        old_parent_id: &str,
    ) -> Result<(), DriveError> {
        self.move_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut objects = self.objects.lock().unwrap();
        let obj = objects
            .iter_mut()
            .find(|o| o.id == folder_id)
            .ok_or_else(|| Self::not_found(folder_id))?;
        obj.parents.retain(|p| p != old_parent_id);
        obj.parents.push(new_parent_id.to_string());
        Ok(())
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveEntry>, DriveError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut entries: Vec<DriveEntry> = self
            .objects()
            .into_iter()
            .filter(|o| o.parents.iter().any(|p| p == parent_id))
            .map(|o| {
                let is_folder = o.mime_type == FOLDER_MIME_TYPE;
                DriveEntry {
                    url: Some(format!("https://drive.example/{}", o.id)),
                    id: o.id,
                    name: o.name,
                    mime_type: o.mime_type,
                    is_folder,
                    size: (!is_folder).then_some(o.size as u64),
                    created_at: None,
                    modified_at: None,
                    thumbnail_url: None,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.is_folder.cmp(&a.is_folder).then(a.name.cmp(&b.name)));
        Ok(entries)
    }

    async fn create_file(&self, upload: FileUpload) -> Result<DriveLink, DriveError> {
        self.create_file_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let id = self.insert(
            &upload.name,
            &upload.parent_id,
            &upload.mime_type,
            upload.content.len(),
        );
        Ok(DriveLink {
            url: format!("https://drive.example/{id}"),
            id,
        })
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), DriveError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut objects = self.objects.lock().unwrap();
        let before = objects.len();
        objects.retain(|o| o.id != file_id);
        if objects.len() == before {
            return Err(Self::not_found(file_id));
        }
        Ok(())
    }

    async fn find_folder_by_exact_name(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<Option<DriveLink>, DriveError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let found = self
            .objects()
            .into_iter()
            .find(|o| {
                o.mime_type == FOLDER_MIME_TYPE
                    && o.name == name
                    && o.parents.iter().any(|p| p == parent_id)
            })
            .map(|o| link(&o.id));
        // Give concurrent resolvers a chance to interleave between find and create.
        tokio::task::yield_now().await;
        Ok(found)
    }
}
