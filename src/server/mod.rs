pub mod router;
pub mod routes;

pub use router::{LeadDriveState, leaddrive_router};
