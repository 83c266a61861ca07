//! Photo payloads: reading image files into data URIs, the photo picked in
//! the form, and the per-candidate photo collection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use base64::{Engine, engine::general_purpose};
use regdesk_core::{Candidate, PhotoRecord};
use regdesk_storage::BlobStore;
use tokio::task::JoinSet;

use crate::ServiceError;

/// Mime type guessed from the file extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Reads a file into a `data:<mime>;base64,<payload>` URI.
pub async fn read_data_uri(path: impl AsRef<Path>) -> Result<String, ServiceError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let payload = general_purpose::STANDARD.encode(&bytes);
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Photo file read");
    Ok(format!("data:{};base64,{payload}", mime_for_path(path)))
}

/// Photo currently attached to the form.
#[derive(Debug, Default)]
pub struct PhotoAttachment {
    state: Mutex<AttachmentState>,
}

#[derive(Debug, Default)]
struct AttachmentState {
    data_uri: Option<String>,
    file_name: Option<String>,
}

impl PhotoAttachment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every file concurrently. Each read that completes replaces the
    /// attached photo, so the one finishing last is kept. Unreadable files
    /// are logged and skipped.
    ///
    /// Returns the number of files read.
    pub async fn select_files(&self, paths: Vec<PathBuf>) -> usize {
        let file_name = paths
            .last()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());
        self.lock().file_name = file_name;

        let mut reads = JoinSet::new();
        for path in paths {
            reads.spawn(async move {
                let result = read_data_uri(&path).await;
                (path, result)
            });
        }

        let mut loaded = 0;
        while let Some(joined) = reads.join_next().await {
            match joined {
                Ok((_, Ok(uri))) => {
                    self.lock().data_uri = Some(uri);
                    loaded += 1;
                },
                Ok((path, Err(e))) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read photo");
                },
                Err(e) => tracing::warn!(error = %e, "Photo read task failed"),
            }
        }
        loaded
    }

    pub fn current(&self) -> Option<String> {
        self.lock().data_uri.clone()
    }

    /// Sets the photo directly, e.g. when restoring a stored candidate.
    pub fn set(&self, data_uri: impl Into<String>) {
        self.lock().data_uri = Some(data_uri.into());
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.data_uri = None;
        state.file_name = None;
    }

    /// Name of the last file in the most recent selection.
    pub fn selected_file_name(&self) -> Option<String> {
        self.lock().file_name.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AttachmentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Stored photos keyed by candidate id.
#[derive(Clone)]
pub struct PhotoService {
    blobs: Arc<dyn BlobStore>,
}

impl PhotoService {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    pub async fn save(&self, candidate_id: &str, data_uri: &str) -> Result<(), ServiceError> {
        self.blobs.put(&PhotoRecord::new(candidate_id.to_owned(), data_uri.to_owned())).await?;
        tracing::debug!(candidate_id, bytes = data_uri.len(), "Photo stored");
        Ok(())
    }

    pub async fn get(&self, candidate_id: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.blobs.get(candidate_id).await?.map(|r| r.photo_base64))
    }

    pub async fn get_all(&self) -> Result<Vec<PhotoRecord>, ServiceError> {
        Ok(self.blobs.get_all().await?)
    }

    pub async fn delete(&self, candidate_id: &str) -> Result<bool, ServiceError> {
        Ok(self.blobs.delete(candidate_id).await?)
    }

    /// Replaces each candidate's inline photo with its stored one, where a
    /// stored one exists.
    pub async fn attach_photos(
        &self,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<Candidate>, ServiceError> {
        let mut photos: HashMap<String, String> =
            self.get_all().await?.into_iter().map(|r| (r.id, r.photo_base64)).collect();
        Ok(candidates
            .into_iter()
            .map(|mut c| {
                if let Some(photo) = photos.remove(&c.id) {
                    c.image_data_url = Some(photo);
                }
                c
            })
            .collect())
    }
}
