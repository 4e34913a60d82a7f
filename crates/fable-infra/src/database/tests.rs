use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;

use fable_core::ports::{PostRepository, UserRepository};

use super::entity::{comment, post, reaction, user};
use super::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

#[tokio::test]
async fn test_find_user_by_id() {
    let user_id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: user_id,
            full_name: "Test User".to_owned(),
            email: "test@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            avatar_url: None,
            role: "admin".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(std::sync::Arc::new(db));

    let found = repo.find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(found.id, user_id);
    assert_eq!(found.role, fable_core::domain::Role::Admin);
}

#[tokio::test]
async fn test_find_post_aggregate_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let liker = Uuid::new_v4();
    let commenter = Uuid::new_v4();
    let now = chrono::Utc::now();

    // The repository issues three queries: post row, reactions, comments.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            author_id,
            title: "Test Post".to_owned(),
            content: "Content".to_owned(),
            cover_image_url: None,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .append_query_results(vec![vec![reaction::Model {
            post_id,
            user_id: liker,
            kind: "like".to_owned(),
        }]])
        .append_query_results(vec![vec![comment::Model {
            id: Uuid::new_v4(),
            post_id,
            author_id: commenter,
            text: "Nice one".to_owned(),
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(std::sync::Arc::new(db));

    let found = repo.find_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(found.title, "Test Post");
    assert_eq!(found.reactions.likes, vec![liker]);
    assert!(found.reactions.dislikes.is_empty());
    assert_eq!(found.comments.len(), 1);
    assert_eq!(found.comments[0].author_id, commenter);
}

#[tokio::test]
async fn test_find_missing_post_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(std::sync::Arc::new(db));

    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}
