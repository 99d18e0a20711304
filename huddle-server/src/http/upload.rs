use async_trait::async_trait;
use axum::extract::multipart::MultipartError;
use chrono::Utc;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "mp3", "ogg", "wav", "m4a", "webm",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file part")]
    MissingFile,

    #[error("no selected file")]
    MissingFilename,

    #[error("file type '{0}' not allowed")]
    ExtensionNotAllowed(String),

    #[error("file exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./uploads"),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Where uploaded attachments go. Returns the URL clients should reference.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(&self, filename: &str, data: &[u8]) -> Result<String, UploadError>;
}

/// Writes blobs under a local directory served at `/uploads`.
pub struct DiskBlobStore {
    root: PathBuf,
    max_bytes: usize,
}

impl DiskBlobStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn store(&self, filename: &str, data: &[u8]) -> Result<String, UploadError> {
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let safe = sanitize_filename(filename).ok_or(UploadError::MissingFilename)?;
        allowed_extension(&safe)?;

        let stored = format!("{}_{}", Utc::now().format("%Y%m%d%H%M%S%6f"), safe);
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&stored), data).await?;

        info!("Stored upload '{}' ({} bytes)", stored, data.len());
        Ok(format!("/uploads/{stored}"))
    }
}

/// Keeps the last path component and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`. Leading dots are dropped.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    (!cleaned.is_empty()).then(|| cleaned.to_owned())
}

fn allowed_extension(filename: &str) -> Result<(), UploadError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(UploadError::ExtensionNotAllowed(ext))
    }
}
