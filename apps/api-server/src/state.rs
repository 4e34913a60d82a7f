//! Application state - shared across all handlers.

use std::sync::Arc;

use fable_core::ports::{ImageStore, PostRepository, UserRepository};
use fable_infra::assets::{AssetCleanup, CloudinaryStore, InMemoryImageStore};
use fable_infra::database::{
    InMemoryPostRepository, InMemoryUserRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub images: Arc<dyn ImageStore>,
    pub cleanup: AssetCleanup,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) =
            match &config.database {
                Some(db_config) => match connect(db_config).await {
                    Ok(conn) => {
                        let conn = Arc::new(conn);
                        (
                            Arc::new(PostgresUserRepository::new(conn.clone())),
                            Arc::new(PostgresPostRepository::new(conn)),
                        )
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        (
                            Arc::new(InMemoryUserRepository::new()),
                            Arc::new(InMemoryPostRepository::new()),
                        )
                    }
                },
                None => {
                    tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                    (
                        Arc::new(InMemoryUserRepository::new()),
                        Arc::new(InMemoryPostRepository::new()),
                    )
                }
            };

        let images: Arc<dyn ImageStore> = match &config.cloudinary {
            Some(cloudinary) => Arc::new(CloudinaryStore::new(cloudinary.clone())),
            None => {
                tracing::warn!("Cloudinary not configured. Using in-memory image store.");
                Arc::new(InMemoryImageStore::new())
            }
        };

        tracing::info!("Application state initialized");

        Self {
            users,
            posts,
            cleanup: AssetCleanup::new(images.clone()),
            images,
        }
    }

    /// Fully in-memory state, used by tests.
    pub fn in_memory() -> Self {
        let images: Arc<dyn ImageStore> = Arc::new(InMemoryImageStore::new());
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            cleanup: AssetCleanup::new(images.clone()),
            images,
        }
    }
}
