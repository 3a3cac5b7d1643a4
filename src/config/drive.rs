use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

/// Google Drive access and folder layout.
#[derive(Clone, Deserialize, Serialize)]
pub struct DriveConfig {
    /// OAuth client id.
    /// TOML: `drive.client_id`. Env: `LEADDRIVE_DRIVE__CLIENT_ID`.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub client_id: String,

    /// OAuth client secret.
    /// TOML: `drive.client_secret`.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub client_secret: String,

    /// Long-lived refresh token with the `drive` scope.
    /// TOML: `drive.refresh_token`.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub refresh_token: String,

    /// TOML: `drive.token_url`. Default: `https://oauth2.googleapis.com/token`.
    #[serde(default = "default_token_url")]
    pub token_url: Url,

    /// Drive v3 REST base.
    /// TOML: `drive.api_url`. Default: `https://www.googleapis.com/drive/v3/`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Drive v3 media upload base.
    /// TOML: `drive.upload_url`. Default: `https://www.googleapis.com/upload/drive/v3/`.
    #[serde(default = "default_upload_url")]
    pub upload_url: Url,

    /// Optional upstream HTTP proxy.
    /// TOML: `drive.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// TOML: `drive.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout for every Drive call.
    /// TOML: `drive.request_timeout_secs`. Default: `60`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Max retry attempts for idempotent Drive reads and token refreshes.
    /// TOML: `drive.retry_max_times`. Default: `3`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// TOML: `[drive.folders]`.
    #[serde(default)]
    pub folders: DriveFolders,
}

/// Parent folder ids of the company Drive layout.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DriveFolders {
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub root: String,

    /// Parent of freshly provisioned lead folders.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub leads: String,

    /// Parent of lead folders once the lead is won.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub projects: String,

    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub development: String,

    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub pr: String,

    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub scan: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            token_url: default_token_url(),
            api_url: default_api_url(),
            upload_url: default_upload_url(),
            proxy: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_max_times: default_retry_max_times(),
            folders: DriveFolders::default(),
        }
    }
}

impl std::fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &str| if s.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("DriveConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("token_url", &self.token_url.as_str())
            .field("api_url", &self.api_url.as_str())
            .field("upload_url", &self.upload_url.as_str())
            .field("proxy", &self.proxy.as_ref().map(Url::as_str))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_max_times", &self.retry_max_times)
            .field("folders", &self.folders)
            .finish()
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(serde::de::Error::custom("expected a string or a number")),
    }
}

fn default_token_url() -> Url {
    Url::parse("https://oauth2.googleapis.com/token").expect("valid Google OAuth token URL")
}

fn default_api_url() -> Url {
    Url::parse("https://www.googleapis.com/drive/v3/").expect("valid Drive API URL")
}

fn default_upload_url() -> Url {
    Url::parse("https://www.googleapis.com/upload/drive/v3/").expect("valid Drive upload URL")
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_retry_max_times() -> usize {
    3
}
