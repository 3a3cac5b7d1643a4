mod drive;
mod leaddrive;
mod oauth;

pub use drive::DriveError;
pub use leaddrive::LeadDriveError;
pub use oauth::OauthError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
