//! HTTP client for the image-hosting collaborator.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ImagingConfig;

use super::{ImageFile, ImageHost, ImagingError};

/// Cloudinary-style hosting client: multipart upload returning a durable
/// secure URL, and a destroy endpoint addressed by public id.
#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryHost {
    pub fn new(config: &ImagingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, file: &ImageFile, folder: &str) -> Result<String, ImagingError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ImagingError::UploadFailed(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string());

        let response = self
            .client
            .post(format!("{}/upload", self.api_base))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImagingError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImagingError::UploadFailed(format!(
                "hosting service returned {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImagingError::UploadFailed(e.to_string()))?;
        Ok(body.secure_url)
    }

    async fn release(&self, resource_id: &str) -> Result<(), ImagingError> {
        let response = self
            .client
            .post(format!("{}/destroy", self.api_base))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .form(&[("public_id", resource_id)])
            .send()
            .await
            .map_err(|e| ImagingError::ReleaseFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImagingError::ReleaseFailed(format!(
                "hosting service returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
