//! HTTP client for the compliance backend.
//!
//! Every collection read returns an envelope keyed by the collection name
//! (`{ "frameworks": [...] }` and so on); this module unwraps those and
//! hands the panels plain vectors. Non-2xx responses and malformed bodies
//! are soft failures surfaced as [`ApiError`], never panics.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::format::mime_for_extension;
use shared::model::{
    Control, ControlList, Document, DocumentList, EvidenceLink, EvidenceList, Framework,
    FrameworkList, UploadReceipt,
};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(1)
        .build()
        .expect("failed to build HTTP client")
});

// Large uploads get their own generous per-request timeout.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Error body shape the backend uses for rejected requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Failure taxonomy for backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, or timeout failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    /// A 2xx response whose body did not parse as the expected shape.
    #[error("malformed response: {0}")]
    Malformed(reqwest::Error),
    /// The selected local file could not be read before upload.
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Short, non-technical message for display. Only backend-provided
    /// detail is surfaced beyond the generic wording.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Status { .. } | ApiError::Malformed(_) => {
                "The server could not complete the request".to_string()
            }
            ApiError::Transport(_) => "Could not reach the server".to_string(),
            ApiError::Io(_) => "Could not read the selected file".to_string(),
        }
    }
}

/// Client for the compliance backend API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a backend-supplied download URL, which may be relative.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    pub async fn list_frameworks(&self) -> Result<Vec<Framework>, ApiError> {
        let list: FrameworkList = self.get_json("/frameworks").await?;
        Ok(list.frameworks)
    }

    pub async fn list_controls(&self, framework_id: &str) -> Result<Vec<Control>, ApiError> {
        let path = format!("/frameworks/{}/controls", framework_id);
        let list: ControlList = self.get_json(&path).await?;
        Ok(list.controls)
    }

    pub async fn list_evidence(&self, control_id: &str) -> Result<Vec<EvidenceLink>, ApiError> {
        let path = format!("/controls/{}/documents", control_id);
        let list: EvidenceList = self.get_json(&path).await?;
        Ok(list.documents)
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        let list: DocumentList = self.get_json("/documents").await?;
        Ok(list.documents)
    }

    /// Upload a single file as multipart field `file`.
    ///
    /// Type and size limits are enforced server-side; the part's MIME type
    /// is only a hint guessed from the extension.
    pub async fn upload_document(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let bytes = tokio::fs::read(path).await?;

        let part = Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str(mime_for_extension(&filename))
            .map_err(ApiError::Transport)?;
        let form = Form::new().part("file", part);

        let url = format!("{}/documents/upload", self.base_url);
        tracing::debug!(%url, file = %filename, "uploading document");
        let resp = self
            .http
            .post(&url)
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        if !resp.status().is_success() {
            return Err(Self::status_error(resp).await);
        }
        resp.json::<UploadReceipt>().await.map_err(ApiError::Malformed)
    }

    /// Delete a document. A 2xx response needs no body.
    pub async fn delete_document(&self, document_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/documents/{}", self.base_url, document_id);
        tracing::debug!(%url, "deleting document");
        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        if !resp.status().is_success() {
            return Err(Self::status_error(resp).await);
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "fetching");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        if !resp.status().is_success() {
            return Err(Self::status_error(resp).await);
        }
        resp.json::<T>().await.map_err(ApiError::Malformed)
    }

    // Extract the backend's `detail` message from an error response, if
    // it sent one.
    async fn status_error(resp: reqwest::Response) -> ApiError {
        let status = resp.status();
        let detail = resp.json::<ErrorBody>().await.ok().map(|b| b.detail);
        tracing::warn!(%status, ?detail, "backend request failed");
        ApiError::Status { status, detail }
    }
}
