use super::{DriveEntry, DriveGateway, DriveLink, DriveTokenSource, FileUpload, folder_url};
use crate::config::DriveConfig;
use crate::error::{DriveError, IsRetryable};
use crate::utils::logging::debug_pretty_json;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use leaddrive_schema::{DriveFile, DriveFileList, DriveFileMetadata, FOLDER_MIME_TYPE};
use reqwest::{RequestBuilder, StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const BODY_PREVIEW_CHARS: usize = 512;
const LIST_PAGE_SIZE: &str = "1000";
const LIST_FIELDS: &str =
    "nextPageToken,files(id,name,mimeType,size,createdTime,modifiedTime,webViewLink,thumbnailLink)";
const LINK_FIELDS: &str = "id,name,webViewLink";

/// Drive v3 REST implementation of [`DriveGateway`].
pub struct GoogleDriveClient {
    http: reqwest::Client,
    tokens: DriveTokenSource,
    api_url: Url,
    upload_url: Url,
    retry_policy: ExponentialBuilder,
}

impl GoogleDriveClient {
    pub fn new(cfg: &DriveConfig) -> Result<Self, DriveError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.request_timeout_secs));
        if let Some(proxy) = &cfg.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        let http = builder.build()?;

        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(cfg.retry_max_times)
            .with_jitter();

        Ok(Self {
            tokens: DriveTokenSource::new(cfg, http.clone()),
            http,
            api_url: cfg.api_url.clone(),
            upload_url: cfg.upload_url.clone(),
            retry_policy,
        })
    }

    fn files_url(base: &Url, file_id: Option<&str>) -> Result<Url, DriveError> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| DriveError::Unexpected(format!("cannot-be-a-base URL: {base}")))?;
            segments.pop_if_empty().push("files");
            if let Some(id) = file_id {
                segments.push(id);
            }
        }
        url.query_pairs_mut().append_pair("supportsAllDrives", "true");
        Ok(url)
    }

    /// Sends an authorized request and maps non-success statuses to [`DriveError`].
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, DriveError> {
        let token = self.tokens.access_token().await?;
        let resp = request.bearer_auth(token).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = match resp.text().await {
            Ok(text) => format!("{:.len$}", text, len = BODY_PREVIEW_CHARS),
            Err(e) => format!("<failed to read body: {e}>"),
        };
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        debug!(%status, body = %body, "Drive upstream returned an error");
        Err(DriveError::UpstreamStatus { status, body })
    }

    /// GET with retry on transient failures. Only used for reads.
    ///
    /// A 401 is re-sent once right away: `send` has already dropped the rejected token,
    /// so the second attempt runs with a fresh one.
    async fn get_json_with_retry<T>(&self, url: &Url) -> Result<T, DriveError>
    where
        T: DeserializeOwned,
    {
        (|| async {
            let resp = match self.send(self.http.get(url.clone())).await {
                Err(e) if e.is_unauthorized() => {
                    debug!(url = %url, "Drive rejected the access token, re-sending once");
                    self.send(self.http.get(url.clone())).await?
                }
                other => other?,
            };
            Ok::<T, DriveError>(resp.json::<T>().await?)
        })
        .retry(self.retry_policy)
        .when(|e: &DriveError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!(url = %url, "Drive read failed: {err}, retrying in {dur:?}");
        })
        .await
    }

    fn link_from(file: DriveFile) -> DriveLink {
        let url = file
            .web_view_link
            .unwrap_or_else(|| folder_url(&file.id));
        DriveLink { id: file.id, url }
    }
}

/// Quotes a value for a Drive `q` expression.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds a `multipart/related` body with JSON metadata and raw media parts.
fn multipart_related(
    boundary: &str,
    metadata: &DriveFileMetadata,
    mime_type: &str,
    content: &[u8],
) -> Result<Vec<u8>, DriveError> {
    let meta = serde_json::to_vec(metadata)?;
    let mut body = Vec::with_capacity(meta.len() + content.len() + 256);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(&meta);
    body.extend_from_slice(format!("\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Ok(body)
}

#[async_trait]
impl DriveGateway for GoogleDriveClient {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<DriveLink, DriveError> {
        let mut url = Self::files_url(&self.api_url, None)?;
        url.query_pairs_mut().append_pair("fields", LINK_FIELDS);
        let metadata = DriveFileMetadata::folder(name, parent_id);
        debug_pretty_json("Drive create folder request", &metadata);

        let resp = self.send(self.http.post(url).json(&metadata)).await?;
        let file: DriveFile = resp.json().await?;
        info!(folder_id = %file.id, name, parent_id, "Drive folder created");
        Ok(Self::link_from(file))
    }

    async fn move_folder(
        &self,
        folder_id: &str,
        new_parent_id: &str,
        old_parent_id: &str,
    ) -> Result<(), DriveError> {
        let mut url = Self::files_url(&self.api_url, Some(folder_id))?;
        url.query_pairs_mut()
            .append_pair("addParents", new_parent_id)
            .append_pair("removeParents", old_parent_id)
            .append_pair("fields", "id,parents");

        let resp = self
            .send(self.http.patch(url).json(&serde_json::json!({})))
            .await?;
        let file: DriveFile = resp.json().await?;
        if !file.parents.is_empty() && !file.parents.iter().any(|p| p == new_parent_id) {
            return Err(DriveError::Unexpected(format!(
                "folder {folder_id} is not under {new_parent_id} after move"
            )));
        }
        info!(folder_id, new_parent_id, old_parent_id, "Drive folder moved");
        Ok(())
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveEntry>, DriveError> {
        let query = format!(
            "'{}' in parents and trashed = false",
            escape_query_value(parent_id)
        );
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Self::files_url(&self.api_url, None)?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("q", &query)
                    .append_pair("fields", LIST_FIELDS)
                    .append_pair("orderBy", "folder,name,createdTime")
                    .append_pair("pageSize", LIST_PAGE_SIZE)
                    .append_pair("includeItemsFromAllDrives", "true");
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let page: DriveFileList = self.get_json_with_retry(&url).await?;
            entries.extend(page.files.into_iter().map(DriveEntry::from));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(parent_id, count = entries.len(), "Drive children listed");
        Ok(entries)
    }

    async fn create_file(&self, upload: FileUpload) -> Result<DriveLink, DriveError> {
        let mut url = Self::files_url(&self.upload_url, None)?;
        url.query_pairs_mut()
            .append_pair("uploadType", "multipart")
            .append_pair("fields", LINK_FIELDS);

        let boundary = format!("leaddrive-{}", uuid::Uuid::new_v4().simple());
        let metadata = DriveFileMetadata::file(&upload.name, &upload.parent_id);
        debug_pretty_json("Drive upload metadata", &metadata);
        let body = multipart_related(&boundary, &metadata, &upload.mime_type, &upload.content)?;

        let request = self
            .http
            .post(url)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body);
        let resp = self.send(request).await?;
        let file: DriveFile = resp.json().await?;
        info!(
            file_id = %file.id,
            name = %upload.name,
            parent_id = %upload.parent_id,
            bytes = upload.content.len(),
            "Drive file uploaded"
        );
        Ok(Self::link_from(file))
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), DriveError> {
        let url = Self::files_url(&self.api_url, Some(file_id))?;
        self.send(self.http.delete(url)).await?;
        info!(file_id, "Drive file deleted");
        Ok(())
    }

    async fn find_folder_by_exact_name(
        &self,
        name: &str,
        parent_id: &str,
    ) -> Result<Option<DriveLink>, DriveError> {
        let query = format!(
            "name = '{}' and '{}' in parents and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false",
            escape_query_value(name),
            escape_query_value(parent_id),
        );
        let mut url = Self::files_url(&self.api_url, None)?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("fields", "files(id,name,webViewLink)")
            .append_pair("orderBy", "createdTime")
            .append_pair("pageSize", "1")
            .append_pair("includeItemsFromAllDrives", "true");

        let page: DriveFileList = self.get_json_with_retry(&url).await?;
        Ok(page
            .files
            .into_iter()
            .find(|f| f.name.as_deref() == Some(name))
            .map(Self::link_from))
    }
}
