//! Client for the file-storage side-service.
//!
//! The indexing pipeline treats remote storage as a best-effort
//! collaborator behind the [`StorageClient`] trait: upload returns an
//! explicit `Result` that the caller inspects to choose the index-only
//! fallback branch, and deletion failures are logged and ignored so the
//! index-level delete always proceeds.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::StorageConfig;

/// A successfully stored file, as reported by the storage service.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "originalName")]
    pub original_name: String,
    /// Unique on-disk name (`<millis>_<sanitized>`), the token used for deletion.
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Storage-location reference recorded on the document.
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    files: Vec<StoredFile>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Abstract file-storage collaborator.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Store raw file bytes under the original filename. Returns the
    /// storage-location token on success.
    async fn upload(&self, original_name: &str, content: &[u8]) -> Result<StoredFile>;

    /// Attempt remote deletion of a stored file by its unique name.
    async fn delete(&self, file_name: &str) -> Result<()>;
}

/// HTTP client for the `docchat serve` file service.
pub struct HttpStorageClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpStorageClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn upload(&self, original_name: &str, content: &[u8]) -> Result<StoredFile> {
        let part = reqwest::multipart::Part::bytes(content.to_vec())
            .file_name(original_name.to_string())
            .mime_str("text/plain")?;
        let form = reqwest::multipart::Form::new().part("files", part);

        let response = self
            .client
            .post(format!("{}/api/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("upload failed: {} {}", status, text);
        }

        let body: UploadResponse = response.json().await?;
        if !body.success {
            bail!("upload failed: server returned error");
        }
        body.files
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("upload failed: server accepted no files"))
    }

    async fn delete(&self, file_name: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/files/{}", self.base_url, file_name))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("delete failed: {} {}", status, text);
        }

        let body: DeleteResponse = response.json().await?;
        if !body.success {
            bail!(
                "delete failed: {}",
                body.error.unwrap_or_else(|| "server returned error".to_string())
            );
        }
        Ok(())
    }
}

/// Extract the deletion token (unique file name) from a storage-location
/// reference like `.uploaded_files/1700000000000_notes.txt`.
pub fn file_name_from_ref(storage_ref: &str) -> Option<&str> {
    storage_ref.rsplit('/').next().filter(|name| !name.is_empty())
}
