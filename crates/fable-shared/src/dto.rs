//! Data Transfer Objects - request/response types for the API.
//!
//! Field names are camelCase on the wire; clients round-trip these shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fable_core::domain::{Comment, Role, User};

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request to sign in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful sign-up/sign-in response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user_id: Uuid,
    pub role: Role,
}

/// Generic mutation acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A user as exposed to clients. The password hash is never included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            avatar: user.avatar_url,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Author details populated onto posts and comments on the read side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorBrief {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<&User> for AuthorBrief {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            avatar: user.avatar_url.clone(),
        }
    }
}

/// A comment with its author populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub text: String,
    pub author: Option<AuthorBrief>,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: &Comment, author: Option<&User>) -> Self {
        Self {
            id: comment.id,
            text: comment.text.clone(),
            author: author.map(AuthorBrief::from),
            created_at: comment.created_at,
        }
    }
}

/// Reaction sets as returned by the reactions endpoint and inside posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionsResponse {
    pub likes: Vec<Uuid>,
    pub dislikes: Vec<Uuid>,
}

/// A post with author and comment authors populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub author: Option<AuthorBrief>,
    pub reactions: ReactionsResponse,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /posts/{id}/reactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Response of `POST /posts/{id}/reactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionUpdateResponse {
    pub message: String,
    pub reactions: ReactionsResponse,
}

/// Body of comment create/update requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

/// Response carrying a single (author-populated) comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentUpdateResponse {
    pub message: String,
    pub comment: CommentResponse,
}
