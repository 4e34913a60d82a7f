//! Externally hosted image storage port.

use async_trait::async_trait;

/// Storage for externally hosted images (avatars, post covers).
///
/// Uploads return the public URL of the stored asset; deletion takes the
/// provider's storage identifier (the "public id"), which callers derive
/// from the URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload an image, returning its public URL.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, ImageStoreError>;

    /// Delete an image by its storage identifier.
    async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError>;
}

/// Image provider errors.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider returned status {0}")]
    Status(u16),
}
