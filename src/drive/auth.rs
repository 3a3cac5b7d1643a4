use crate::config::DriveConfig;
use crate::error::{DriveError, IsRetryable, OauthError};
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    ClientId, ClientSecret, EndpointNotSet, EndpointSet, RefreshToken, TokenResponse, TokenUrl,
};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

type DriveOauth2Client =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Google issues one-hour tokens when `expires_in` is absent.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Cached access token for the service account's refresh token.
#[derive(Clone, Default)]
pub struct DriveCredential {
    pub access_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl DriveCredential {
    /// True within 5 minutes of expiry, or when nothing has been fetched yet.
    pub fn is_expired(&self) -> bool {
        match (&self.access_token, self.expiry) {
            (Some(_), Some(expiry)) => Utc::now() + ChronoDuration::minutes(5) >= expiry,
            _ => true,
        }
    }
}

impl std::fmt::Debug for DriveCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveCredential")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Exchanges the configured refresh token for access tokens and caches the result.
///
/// Concurrent callers that find the token expired queue on the same mutex, so only
/// the first one performs the exchange.
pub struct DriveTokenSource {
    oauth: DriveOauth2Client,
    refresh_token: String,
    http: reqwest::Client,
    retry_policy: ExponentialBuilder,
    credential: Mutex<DriveCredential>,
}

impl DriveTokenSource {
    pub fn new(cfg: &DriveConfig, http: reqwest::Client) -> Self {
        let oauth = BasicClient::new(ClientId::new(cfg.client_id.clone()))
            .set_client_secret(ClientSecret::new(cfg.client_secret.clone()))
            .set_token_uri(TokenUrl::from_url(cfg.token_url.clone()));
        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(3))
            .with_max_times(cfg.retry_max_times)
            .with_jitter();
        Self {
            oauth,
            refresh_token: cfg.refresh_token.clone(),
            http,
            retry_policy,
            credential: Mutex::new(DriveCredential::default()),
        }
    }

    /// Returns a valid bearer token, refreshing it first if needed.
    pub async fn access_token(&self) -> Result<String, DriveError> {
        let mut cred = self.credential.lock().await;
        if !cred.is_expired()
            && let Some(token) = &cred.access_token
        {
            return Ok(token.clone());
        }

        let fresh = self.refresh().await?;
        let token = fresh.access_token.clone().unwrap_or_default();
        *cred = fresh;
        Ok(token)
    }

    /// Drops the cached token so the next call performs a refresh.
    pub async fn invalidate(&self) {
        *self.credential.lock().await = DriveCredential::default();
    }

    async fn refresh(&self) -> Result<DriveCredential, DriveError> {
        debug!("Refreshing Drive access token");
        let refresh_token = RefreshToken::new(self.refresh_token.clone());
        let response = (|| async {
            self.oauth
                .exchange_refresh_token(&refresh_token)
                .request_async(&self.http)
                .await
                .map_err(OauthError::from)
        })
        .retry(self.retry_policy)
        .when(|e: &OauthError| e.is_retryable())
        .notify(|err, dur: Duration| {
            error!("Drive token refresh failed: {err}, retrying in {dur:?}");
        })
        .await?;

        let lifetime = response
            .expires_in()
            .and_then(|d| i64::try_from(d.as_secs()).ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        info!(expires_in = lifetime, "Drive access token refreshed");
        Ok(DriveCredential {
            access_token: Some(response.access_token().secret().to_string()),
            expiry: Some(Utc::now() + ChronoDuration::seconds(lifetime)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credential_is_expired() {
        assert!(DriveCredential::default().is_expired());
    }

    #[test]
    fn expiry_buffer_is_five_minutes() {
        let soon = DriveCredential {
            access_token: Some("t".into()),
            expiry: Some(Utc::now() + ChronoDuration::minutes(4)),
        };
        assert!(soon.is_expired());

        let later = DriveCredential {
            access_token: Some("t".into()),
            expiry: Some(Utc::now() + ChronoDuration::minutes(30)),
        };
        assert!(!later.is_expired());
    }

    #[test]
    fn debug_redacts_token() {
        let cred = DriveCredential {
            access_token: Some("ya29.secret".into()),
            expiry: None,
        };
        assert!(!format!("{cred:?}").contains("ya29"));
    }
}
