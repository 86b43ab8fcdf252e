//! Blob storage for ticket attachments
//!
//! Files live flat in the uploads directory under
//! `<millis>-<uuid>-<sanitised original name>`. Only that bare name is
//! recorded, so the API serves it as `/uploads/<name>`.

use crate::config::UploadSettings;
use crate::core::StoredFile;
use crate::error::{OfficeTicketError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("Invalid file name regex"));

/// An uploaded file held in memory
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Validates uploads and writes them under the uploads directory
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
    max_bytes: u64,
    max_files: usize,
    allowed: Regex,
}

impl BlobStore {
    pub fn new(settings: &UploadSettings) -> Result<Self> {
        let alternatives = settings
            .allowed_extensions
            .iter()
            .map(|ext| regex::escape(ext.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join("|");
        let allowed = Regex::new(&format!(r"(?i)\.(?:{alternatives})$"))
            .map_err(|e| OfficeTicketError::Custom(format!("Invalid extension list: {e}")))?;

        Ok(Self {
            dir: settings.dir.clone(),
            max_bytes: settings.max_bytes,
            max_files: settings.max_files,
            allowed,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reject the batch if any file breaks a limit; nothing is written
    pub fn validate(&self, uploads: &[Upload]) -> Result<()> {
        if uploads.len() > self.max_files {
            return Err(OfficeTicketError::AttachmentRejected(format!(
                "At most {} files per ticket",
                self.max_files
            )));
        }
        for upload in uploads {
            if !self.allowed.is_match(&upload.file_name) {
                return Err(OfficeTicketError::AttachmentRejected(format!(
                    "{}: only images and documents are allowed",
                    upload.file_name
                )));
            }
            if upload.bytes.len() as u64 > self.max_bytes {
                return Err(OfficeTicketError::AttachmentRejected(format!(
                    "{}: larger than {} bytes",
                    upload.file_name, self.max_bytes
                )));
            }
        }
        Ok(())
    }

    /// Validate then write every upload
    ///
    /// On a write failure the files already written are removed again.
    pub async fn store_all(&self, uploads: &[Upload], now_millis: i64) -> Result<Vec<StoredFile>> {
        self.validate(uploads)?;
        if uploads.is_empty() {
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.write(upload, now_millis).await {
                Ok(file) => stored.push(file),
                Err(e) => {
                    self.remove_all(&stored).await;
                    return Err(e);
                },
            }
        }
        Ok(stored)
    }

    async fn write(&self, upload: &Upload, now_millis: i64) -> Result<StoredFile> {
        let stored_name = format!(
            "{now_millis}-{}-{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(&upload.file_name)
        );
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, &upload.bytes).await?;
        tracing::debug!("Stored attachment {} as {}", upload.file_name, path.display());

        Ok(StoredFile {
            file_name: upload.file_name.clone(),
            file_path: stored_name,
        })
    }

    /// On-disk location of a stored file
    pub fn path_of(&self, file: &StoredFile) -> PathBuf {
        self.dir.join(&file.file_path)
    }

    /// Best-effort removal of files that never got linked to a ticket
    pub async fn remove_all(&self, files: &[StoredFile]) {
        for file in files {
            if let Err(e) = tokio::fs::remove_file(self.path_of(file)).await {
                tracing::warn!("Failed to remove orphaned upload {}: {e}", file.file_path);
            }
        }
    }
}

/// Keep only the base name and replace anything outside `[A-Za-z0-9._-]`
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}
