//! Google Drive v3 `files` resource, limited to the fields this service requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Mime type Drive uses to mark an entry as a folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub mime_type: Option<String>,

    /// Drive encodes int64 values as JSON strings.
    #[serde(
        default,
        deserialize_with = "deserialize_opt_u64_lax",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Request body for `files.create` (folders and the metadata part of uploads).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    pub parents: Vec<String>,
}

impl DriveFileMetadata {
    pub fn folder(name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            parents: vec![parent_id.into()],
        }
    }

    pub fn file(name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            parents: vec![parent_id.into()],
        }
    }
}

fn deserialize_opt_u64_lax<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    match v {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid size {s:?}: {e}"))),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("size must be a non-negative integer")),
        Some(_) => Err(serde::de::Error::custom(
            "expected a string or a number for size",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_list_accepts_string_sizes_and_missing_fields() {
        let raw = r#"{
            "nextPageToken": "abc",
            "files": [
                {"id": "f1", "name": "Plans", "mimeType": "application/vnd.google-apps.folder"},
                {"id": "f2", "name": "quote.pdf", "mimeType": "application/pdf", "size": "2048",
                 "createdTime": "2025-12-02T04:41:14.000Z", "webViewLink": "https://x/f2"}
            ]
        }"#;
        let list: DriveFileList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.next_page_token.as_deref(), Some("abc"));
        assert!(list.files[0].is_folder());
        assert_eq!(list.files[0].size, None);
        assert!(!list.files[1].is_folder());
        assert_eq!(list.files[1].size, Some(2048));
        assert!(list.files[1].created_time.is_some());
    }

    #[test]
    fn folder_metadata_carries_folder_mime_type() {
        let json = serde_json::to_value(DriveFileMetadata::folder("1316 - UNKNOWN", "p1")).unwrap();
        assert_eq!(json["mimeType"], FOLDER_MIME_TYPE);
        assert_eq!(json["parents"][0], "p1");

        let json = serde_json::to_value(DriveFileMetadata::file("a.txt", "p1")).unwrap();
        assert!(json.get("mimeType").is_none());
    }
}
