//! Asset cleanup: best-effort deletion of externally hosted images.

mod cloudinary;
mod memory;

use std::sync::Arc;

use fable_core::ports::ImageStore;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use memory::InMemoryImageStore;

/// Folder every upload lands in; its presence in a URL is how we recognize
/// assets we own.
pub const UPLOAD_FOLDER: &str = "blog-uploads";

/// Derive the provider storage id from an asset URL.
///
/// Matches the `/blog-uploads/<public-id>.<ext>` segment; URLs that don't
/// match are not ours to delete and yield `None`.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let marker = format!("/{UPLOAD_FOLDER}/");
    let start = url.find(&marker)? + marker.len();
    let rest = &url[start..];
    let id = rest.split('.').next().unwrap_or(rest);

    if id.is_empty() {
        None
    } else {
        Some(format!("{UPLOAD_FOLDER}/{id}"))
    }
}

/// Outcome of a single cleanup attempt. Logged, never escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The asset was deleted from the provider.
    Deleted,
    /// Nothing to delete, or the URL didn't match the expected pattern
    /// (the asset is orphaned - a known, accepted limitation).
    Skipped,
    /// The provider call failed; the failure was logged and swallowed.
    Failed,
}

/// Best-effort cleanup of externally stored images.
///
/// Every operation that replaces or removes an image-bearing field goes
/// through here. Failures never block or fail the primary mutation: losing
/// an orphaned remote asset is cheaper than failing a user-visible request.
#[derive(Clone)]
pub struct AssetCleanup {
    store: Arc<dyn ImageStore>,
}

impl AssetCleanup {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    /// Delete the asset behind a URL, if the URL is recognized.
    pub async fn delete_url(&self, url: &str) -> CleanupOutcome {
        let Some(public_id) = public_id_from_url(url) else {
            tracing::debug!(%url, "Asset URL does not match upload pattern, skipping cleanup");
            return CleanupOutcome::Skipped;
        };

        match self.store.delete(&public_id).await {
            Ok(()) => {
                tracing::debug!(%public_id, "Deleted remote asset");
                CleanupOutcome::Deleted
            }
            Err(e) => {
                tracing::warn!(%public_id, error = %e, "Failed to delete remote asset");
                CleanupOutcome::Failed
            }
        }
    }

    /// Convenience for nullable image fields.
    pub async fn delete_url_opt(&self, url: Option<&str>) -> CleanupOutcome {
        match url {
            Some(url) => self.delete_url(url).await,
            None => CleanupOutcome::Skipped,
        }
    }
}
