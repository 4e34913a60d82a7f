use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Role;
use crate::error::DomainError;

/// A reaction a user can leave on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactionKind::Like => f.write_str("like"),
            ReactionKind::Dislike => f.write_str("dislike"),
        }
    }
}

impl FromStr for ReactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ReactionKind::Like),
            "dislike" => Ok(ReactionKind::Dislike),
            _ => Err(DomainError::InvalidInput(
                "Invalid reaction type. Supported types are 'like' and 'dislike'.".to_string(),
            )),
        }
    }
}

/// Like/dislike sets of a post.
///
/// Invariant: a user id appears in at most one of the two sets at any time.
/// The toggle operation enforces this by removal, not by precondition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reactions {
    pub likes: Vec<Uuid>,
    pub dislikes: Vec<Uuid>,
}

impl Reactions {
    /// Apply a reaction toggle for a user.
    ///
    /// Repeating the same kind removes the reaction (toggle off); switching
    /// kinds moves the user from one set to the other.
    pub fn toggle(&mut self, user_id: Uuid, kind: ReactionKind) {
        let (target, opposite) = match kind {
            ReactionKind::Like => (&mut self.likes, &mut self.dislikes),
            ReactionKind::Dislike => (&mut self.dislikes, &mut self.likes),
        };

        if let Some(pos) = target.iter().position(|id| *id == user_id) {
            target.remove(pos);
        } else {
            target.push(user_id);
            if let Some(pos) = opposite.iter().position(|id| *id == user_id) {
                opposite.remove(pos);
            }
        }
    }
}

/// Comment embedded in a post. Comments have no lifecycle of their own:
/// they are created, mutated, and deleted only through their parent post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Post aggregate: the post itself plus its reactions and comments.
/// Persisted as a whole (read-modify-write, last write wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub reactions: Reactions,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(
        author_id: Uuid,
        title: String,
        content: String,
        cover_image_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            content,
            cover_image_url,
            reactions: Reactions::default(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a new comment with a fresh id and current timestamp.
    pub fn add_comment(&mut self, author_id: Uuid, text: String) -> Result<&Comment, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Comment text is required.".to_string(),
            ));
        }

        self.comments.push(Comment {
            id: Uuid::new_v4(),
            author_id,
            text,
            created_at: Utc::now(),
        });
        self.touch();

        Ok(self.comments.last().unwrap())
    }

    /// Replace a comment's text in place. The comment's timestamp is not
    /// changed. Only the comment's author or an admin may update it.
    pub fn update_comment(
        &mut self,
        comment_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
        text: String,
    ) -> Result<&Comment, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Comment text is required.".to_string(),
            ));
        }

        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or(DomainError::NotFound { entity: "Comment" })?;

        if !actor_role.can_mutate(actor_id, comment.author_id) {
            return Err(DomainError::Forbidden(
                "You do not have permission to update this comment.".to_string(),
            ));
        }

        comment.text = text;
        self.touch();

        Ok(self
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .unwrap())
    }

    /// Remove a comment. Only the comment's author or an admin may delete it.
    pub fn delete_comment(
        &mut self,
        comment_id: Uuid,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<(), DomainError> {
        let pos = self
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or(DomainError::NotFound { entity: "Comment" })?;

        if !actor_role.can_mutate(actor_id, self.comments[pos].author_id) {
            return Err(DomainError::Forbidden(
                "You do not have permission to delete this comment.".to_string(),
            ));
        }

        self.comments.remove(pos);
        self.touch();

        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
