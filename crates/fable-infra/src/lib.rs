//! # Fable Infrastructure
//!
//! Concrete implementations of the ports defined in `fable-core`:
//! database repositories, authentication, and the image hosting provider.

pub mod assets;
pub mod auth;
pub mod database;

pub use assets::{AssetCleanup, CleanupOutcome, CloudinaryConfig, CloudinaryStore, InMemoryImageStore};
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};
