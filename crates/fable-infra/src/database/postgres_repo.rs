//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use fable_core::domain::{Post, User};
use fable_core::error::RepoError;
use fable_core::ports::{PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::reaction::{self, Entity as ReactionEntity};
use super::entity::user::{self, Entity as UserEntity};

fn map_db_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: Arc<DbConn>,
}

impl PostgresUserRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn save(&self, saved: User) -> Result<User, RepoError> {
        let active_model: user::ActiveModel = saved.clone().into();

        UserEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([
                        user::Column::FullName,
                        user::Column::Email,
                        user::Column::PasswordHash,
                        user::Column::AvatarUrl,
                        user::Column::Role,
                        user::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// PostgreSQL post repository. Loads and stores the whole aggregate:
/// the post row plus its reaction and comment child rows.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }

    fn assemble(
        model: post::Model,
        reactions: Vec<reaction::Model>,
        comments: Vec<comment::Model>,
    ) -> Post {
        let mut post: Post = model.into();
        for r in reactions {
            match r.kind.as_str() {
                "like" => post.reactions.likes.push(r.user_id),
                "dislike" => post.reactions.dislikes.push(r.user_id),
                other => tracing::warn!(kind = other, "Unknown reaction kind in database"),
            }
        }
        post.comments = comments.into_iter().map(Into::into).collect();
        post
    }

    async fn load_aggregates(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

        let reactions = ReactionEntity::find()
            .filter(reaction::Column::PostId.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        let comments = CommentEntity::find()
            .filter(comment::Column::PostId.is_in(ids.iter().copied()))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        let mut reactions_by_post: HashMap<Uuid, Vec<reaction::Model>> = HashMap::new();
        for r in reactions {
            reactions_by_post.entry(r.post_id).or_default().push(r);
        }
        let mut comments_by_post: HashMap<Uuid, Vec<comment::Model>> = HashMap::new();
        for c in comments {
            comments_by_post.entry(c.post_id).or_default().push(c);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let reactions = reactions_by_post.remove(&m.id).unwrap_or_default();
                let comments = comments_by_post.remove(&m.id).unwrap_or_default();
                Self::assemble(m, reactions, comments)
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let reactions = ReactionEntity::find()
            .filter(reaction::Column::PostId.eq(id))
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        let comments = CommentEntity::find()
            .filter(comment::Column::PostId.eq(id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(Some(Self::assemble(model, reactions, comments)))
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        self.load_aggregates(models).await
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(map_db_err)?;

        self.load_aggregates(models).await
    }

    async fn save(&self, saved: Post) -> Result<Post, RepoError> {
        // Whole-aggregate write: upsert the post row, then replace the
        // reaction and comment collections. Not transactional - a crash
        // mid-save can leave partial state (accepted limitation).
        let active_model: post::ActiveModel = (&saved).into();

        PostEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(post::Column::Id)
                    .update_columns([
                        post::Column::Title,
                        post::Column::Content,
                        post::Column::CoverImageUrl,
                        post::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        ReactionEntity::delete_many()
            .filter(reaction::Column::PostId.eq(saved.id))
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        let reaction_rows: Vec<reaction::ActiveModel> = saved
            .reactions
            .likes
            .iter()
            .map(|user_id| {
                reaction::Model::active_model(
                    saved.id,
                    *user_id,
                    fable_core::domain::ReactionKind::Like,
                )
            })
            .chain(saved.reactions.dislikes.iter().map(|user_id| {
                reaction::Model::active_model(
                    saved.id,
                    *user_id,
                    fable_core::domain::ReactionKind::Dislike,
                )
            }))
            .collect();

        if !reaction_rows.is_empty() {
            ReactionEntity::insert_many(reaction_rows)
                .exec(&*self.db)
                .await
                .map_err(map_db_err)?;
        }

        CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(saved.id))
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        let comment_rows: Vec<comment::ActiveModel> = saved
            .comments
            .iter()
            .map(|c| comment::Model::active_model(saved.id, c))
            .collect();

        if !comment_rows.is_empty() {
            CommentEntity::insert_many(comment_rows)
                .exec(&*self.db)
                .await
                .map_err(map_db_err)?;
        }

        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::AuthorId.eq(author_id))
            .exec(&*self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}
