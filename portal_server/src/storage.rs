//! Media storage for uploaded files (gallery photos, résumés, page images).
//!
//! Keys are path-like strings: `gallery/<uuid>.jpg`, `resumes/<uuid>.pdf`.
//! [`FileStore`] keeps them under a local directory that the server exposes
//! at `/media`; [`HttpObjectStore`] PUTs them to an object-storage bucket.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::config::{PortalConfig, StorageBackend};
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid media key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object storage request failed: {0}")]
    Remote(String),
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an object, overwriting any existing one. Returns its public URL.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String, StorageError>;

    /// Delete an object. No-op if the key does not exist.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Build the backend selected in configuration.
pub fn from_config(config: &PortalConfig) -> anyhow::Result<std::sync::Arc<dyn MediaStore>> {
    Ok(match config.storage_backend {
        StorageBackend::Filesystem => std::sync::Arc::new(FileStore::open(
            Path::new(&config.storage_path),
            &config.media_base_url,
        )?),
        StorageBackend::Http => std::sync::Arc::new(HttpObjectStore::new(
            &config.storage_endpoint,
            &config.storage_token,
            &config.media_base_url,
        )),
    })
}

/// Reject empty, absolute and traversing keys.
fn check_key(key: &str) -> Result<(), StorageError> {
    let path = Path::new(key);
    let clean = !key.is_empty()
        && !key.contains('\\')
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if clean {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Local filesystem backend.
pub struct FileStore {
    base_dir: PathBuf,
    base_url: String,
}

impl FileStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed.
    pub fn open(base_dir: &Path, base_url: &str) -> Result<Self, StorageError> {
        std::fs::create_dir_all(base_dir)?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            base_url: base_url.to_string(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl MediaStore for FileStore {
    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<String, StorageError> {
        check_key(key)?;
        let path = self.base_dir.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(public_url(&self.base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        match tokio::fs::remove_file(self.base_dir.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Object storage reached over plain HTTP (S3-compatible buckets behind a
/// gateway, R2/Spaces with a bearer token, etc.).
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, token: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
            base_url: base_url.to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint, key)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.is_empty() {
            req
        } else {
            req.header("Authorization", format!("Bearer {}", self.token))
        }
    }
}

#[async_trait]
impl MediaStore for HttpObjectStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String, StorageError> {
        check_key(key)?;
        let resp = self
            .authorize(self.client.put(self.object_url(key)))
            .header("Content-Type", content_type)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(key, %status, "object upload failed: {}", text);
            return Err(StorageError::Remote(format!("PUT {key} returned {status}")));
        }
        Ok(public_url(&self.base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let resp = self
            .authorize(self.client.delete(self.object_url(key)))
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;

        let status = resp.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(StorageError::Remote(format!("DELETE {key} returned {status}")))
        }
    }
}

// ── Upload validation ──

/// What an upload is for; decides the accepted MIME types and key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Gallery,
    Resume,
    PageImage,
}

impl UploadKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Resume => "resumes",
            Self::PageImage => "images",
        }
    }

    fn allowed(self) -> &'static [&'static str] {
        match self {
            Self::Gallery | Self::PageImage => IMAGE_TYPES,
            Self::Resume => DOCUMENT_TYPES,
        }
    }
}

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
const DOCUMENT_TYPES: &[&str] = &["application/pdf"];

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

/// Whether the leading bytes look like `content_type`.
fn magic_matches(content_type: &str, data: &[u8]) -> bool {
    match content_type {
        "image/jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        "image/png" => data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        "image/gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        "image/webp" => data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP",
        "application/pdf" => data.starts_with(b"%PDF-"),
        _ => false,
    }
}

/// A file from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Check size and type, and derive a fresh storage key.
pub fn validate_upload(kind: UploadKind, file: &UploadedFile, max_bytes: usize) -> Result<String, ApiError> {
    if file.data.is_empty() {
        return Err(ApiError::validation("uploaded file is empty"));
    }
    if file.data.len() > max_bytes {
        return Err(ApiError::validation(format!(
            "uploaded file exceeds the {max_bytes} byte limit"
        )));
    }
    let content_type = file.content_type.to_ascii_lowercase();
    if !kind.allowed().contains(&content_type.as_str()) {
        return Err(ApiError::validation(format!(
            "unsupported file type {content_type}; allowed: {}",
            kind.allowed().join(", ")
        )));
    }
    if !magic_matches(&content_type, &file.data) {
        return Err(ApiError::validation(
            "file contents do not match the declared type",
        ));
    }
    Ok(format!(
        "{}/{}.{}",
        kind.prefix(),
        uuid::Uuid::new_v4(),
        extension_for(&content_type)
    ))
}
