pub mod config;
pub mod db;
pub mod drive;
pub mod error;
pub mod leads;
pub mod server;
pub mod utils;

pub use config::Config;
pub use error::{DriveError, LeadDriveError};
pub use leads::LeadDriveService;
