//! Lead folder workflow: numbering, naming, folder resolution and the operations
//! exposed over HTTP.

pub mod naming;
pub mod numbering;
pub mod resolver;
pub mod service;
pub mod state;

pub use naming::{format_client_number, format_lead_folder_name, format_project_folder_name};
pub use numbering::ClientNumberAllocator;
pub use resolver::FolderResolver;
pub use service::{IncomingFile, LeadDriveService, LeadDriveSettings, ProvisionedFolder};
pub use state::FolderState;
