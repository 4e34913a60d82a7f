use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Find a user by their (case-normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// All users, newest first.
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;

    /// Users matching any of the given ids. Used to populate author details
    /// on the read side.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    /// Save a user (create or update).
    async fn save(&self, user: User) -> Result<User, RepoError>;

    /// Delete a user by ID.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Post repository. Posts are stored and loaded as whole aggregates,
/// including their reactions and comments.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post aggregate by its unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// All posts, newest first.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// All posts authored by the given user.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Save a post aggregate (create or update), replacing its reaction and
    /// comment collections wholesale. Last write wins.
    async fn save(&self, post: Post) -> Result<Post, RepoError>;

    /// Delete a post by ID.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Delete every post authored by the given user, returning the count.
    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}
