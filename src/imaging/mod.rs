//! Image lifecycle against the external hosting collaborator.
//!
//! Ordering rules: uploads happen before the owning record is committed, so
//! a failed upload aborts the mutation with nothing persisted; releases
//! happen after the new state is durably written and are best-effort only.

pub mod cloudinary;

use async_trait::async_trait;

/// In-memory reference to an uploaded file, extracted from the request at
/// the handler boundary.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("image upload failed: {0}")]
    UploadFailed(String),
    #[error("image release failed: {0}")]
    ReleaseFailed(String),
    #[error("stored image reference is malformed: {0}")]
    MalformedReference(String),
}

/// Capability contract of the hosting collaborator.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Transmit a file to the collaborator; returns the durable URL to
    /// store on the record.
    async fn upload(&self, file: &ImageFile, folder: &str) -> Result<String, ImagingError>;

    /// Request deletion of a previously uploaded asset.
    async fn release(&self, resource_id: &str) -> Result<(), ImagingError>;
}

/// Derive the collaborator's resource id from a stored URL: the last path
/// segment stripped of its extension, qualified by the upload folder.
pub fn resource_id(hosted_url: &str, folder: &str) -> Result<String, ImagingError> {
    let parsed = url::Url::parse(hosted_url)
        .map_err(|e| ImagingError::MalformedReference(format!("{hosted_url}: {e}")))?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ImagingError::MalformedReference(format!("{hosted_url}: no path segment"))
        })?;

    let stem = match segment.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => segment,
    };
    if stem.is_empty() {
        return Err(ImagingError::MalformedReference(format!(
            "{hosted_url}: empty resource name"
        )));
    }

    Ok(format!("{folder}/{stem}"))
}
