//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `patch.rs`: write payloads
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the single actor owning the pool

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

pub use actor::{DbActorHandle, spawn};
pub use models::{DbLead, DbProject};
pub use patch::{ClientNumberAssign, FolderLink, FolderMove, LeadUpsert, ProjectCreate};
pub use schema::SQLITE_INIT;

/// Settings key of the client number counter.
pub const CLIENT_NUMBER_KEY: &str = "next_client_number";
