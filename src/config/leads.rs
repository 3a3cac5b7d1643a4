use serde::{Deserialize, Serialize};

/// Client numbering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NumberingConfig {
    /// First client number handed out when the counter does not exist yet.
    /// TOML: `numbering.seed`. Default: `1316`.
    #[serde(default = "default_seed")]
    pub seed: i64,

    /// Zero-padded width used when displaying a client number. Folder names stay unpadded.
    /// TOML: `numbering.display_width`. Default: `4`.
    #[serde(default = "default_display_width")]
    pub display_width: usize,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            display_width: default_display_width(),
        }
    }
}

/// Lead workflow settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeadsConfig {
    /// Pipeline stage id that counts as "won". When unset, moving to Projects is not gated.
    /// TOML: `leads.won_stage_id`.
    #[serde(default)]
    pub won_stage_id: Option<i64>,

    /// Upload size limit in bytes.
    /// TOML: `leads.max_upload_bytes`. Default: 50 MiB.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for LeadsConfig {
    fn default() -> Self {
        Self {
            won_stage_id: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_seed() -> i64 {
    1316
}

fn default_display_width() -> usize {
    4
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}
