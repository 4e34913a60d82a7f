//! Cloudinary-backed image store.
//!
//! Uploads go through an unsigned upload preset; deletes use the Admin API
//! with basic auth, so no request signing is needed.

use async_trait::async_trait;
use serde::Deserialize;

use fable_core::ports::{ImageStore, ImageStoreError};

use super::UPLOAD_FOLDER;

/// Cloudinary credentials and upload settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub upload_preset: String,
}

impl CloudinaryConfig {
    /// Load from `CLOUDINARY_*` environment variables. Returns `None` when
    /// the provider is not configured.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME").ok()?,
            api_key: std::env::var("CLOUDINARY_API_KEY").ok()?,
            api_secret: std::env::var("CLOUDINARY_API_SECRET").ok()?,
            upload_preset: std::env::var("CLOUDINARY_UPLOAD_PRESET")
                .unwrap_or_else(|_| "blog-uploads".to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Image store backed by the Cloudinary REST API.
pub struct CloudinaryStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, ImageStoreError> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        );

        let file_part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("folder", UPLOAD_FOLDER);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageStoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageStoreError::Status(response.status().as_u16()));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageStoreError::Request(e.to_string()))?;

        Ok(body.secure_url)
    }

    async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/resources/image/upload",
            self.config.cloud_name
        );

        let response = self
            .client
            .delete(&url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .query(&[("public_ids[]", public_id)])
            .send()
            .await
            .map_err(|e| ImageStoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageStoreError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}
