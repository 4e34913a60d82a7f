//! In-memory image store - used in DB-less mode and in tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use fable_core::ports::{ImageStore, ImageStoreError};

use super::UPLOAD_FOLDER;

/// In-memory image store keeping live public ids in a HashSet.
///
/// Records every delete attempt, which lets tests assert on cascade
/// cleanup behavior. Data is lost on process restart.
pub struct InMemoryImageStore {
    live: Mutex<HashSet<String>>,
    delete_attempts: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self {
            live: Mutex::new(HashSet::new()),
            delete_attempts: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Seed a stored asset directly, returning its URL.
    pub fn seed(&self, id: &str, ext: &str) -> String {
        let public_id = format!("{UPLOAD_FOLDER}/{id}");
        self.live.lock().unwrap().insert(public_id);
        format!("https://images.invalid/{UPLOAD_FOLDER}/{id}.{ext}")
    }

    /// Make subsequent delete calls fail, to exercise best-effort paths.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::Relaxed);
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.live.lock().unwrap().contains(public_id)
    }

    pub fn delete_attempts(&self) -> usize {
        self.delete_attempts.lock().unwrap().len()
    }
}

impl Default for InMemoryImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, filename: &str, _bytes: Vec<u8>) -> Result<String, ImageStoreError> {
        let ext = filename.rsplit('.').next().unwrap_or("png");
        let id = Uuid::new_v4().simple().to_string();
        Ok(self.seed(&id, ext))
    }

    async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError> {
        self.delete_attempts
            .lock()
            .unwrap()
            .push(public_id.to_string());

        if self.fail_deletes.load(Ordering::Relaxed) {
            return Err(ImageStoreError::Request("simulated failure".to_string()));
        }

        self.live.lock().unwrap().remove(public_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::public_id_from_url;

    #[tokio::test]
    async fn test_upload_then_delete() {
        let store = InMemoryImageStore::new();

        let url = store.upload("cover.jpg", vec![1, 2, 3]).await.unwrap();
        let public_id = public_id_from_url(&url).unwrap();
        assert!(store.contains(&public_id));

        store.delete(&public_id).await.unwrap();
        assert!(!store.contains(&public_id));
        assert_eq!(store.delete_attempts(), 1);
    }
}
