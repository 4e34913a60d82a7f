//! Post handlers: CRUD, reactions, and comments.

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use fable_core::domain::{Post, ReactionKind, User};
use fable_shared::dto::{
    CommentRequest, CommentResponse, CommentUpdateResponse, MessageResponse, PostResponse,
    ReactionRequest, ReactionUpdateResponse, ReactionsResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::upload::read_form;

fn parse_post_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::BadRequest("Invalid post id.".to_string()))
}

/// Fetch every user referenced by the given posts (authors and comment
/// authors), keyed by id, for read-side population.
async fn author_map(
    state: &AppState,
    posts: &[Post],
) -> Result<HashMap<Uuid, User>, AppError> {
    let mut ids: Vec<Uuid> = Vec::new();
    for post in posts {
        ids.push(post.author_id);
        ids.extend(post.comments.iter().map(|c| c.author_id));
    }
    ids.sort_unstable();
    ids.dedup();

    let users = state.users.find_by_ids(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

fn post_response(post: &Post, authors: &HashMap<Uuid, User>) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        cover_image: post.cover_image_url.clone(),
        author: authors.get(&post.author_id).map(Into::into),
        reactions: ReactionsResponse {
            likes: post.reactions.likes.clone(),
            dislikes: post.reactions.dislikes.clone(),
        },
        comments: post
            .comments
            .iter()
            .map(|c| CommentResponse::new(c, authors.get(&c.author_id)))
            .collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// GET /posts - all posts, newest first, authors populated.
pub async fn list(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all().await?;
    let authors = author_map(&state, &posts).await?;

    let posts: Vec<PostResponse> = posts.iter().map(|p| post_response(p, &authors)).collect();
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /posts - multipart: `title` and `content` required, optional
/// `coverImage`. A stranded upload (validation or persistence failure after
/// the image is already stored) is cleaned up best-effort.
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, "coverImage").await?;

    let cover_url = match form.file.take() {
        Some(file) => match state.images.upload(&file.filename, file.bytes).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::error!(error = %e, "Cover image upload failed");
                return Err(AppError::Internal("Cover image upload failed".to_string()));
            }
        },
        None => None,
    };

    let (title, content) = match (form.text("title"), form.text("content")) {
        (Some(title), Some(content)) => (title.to_string(), content.to_string()),
        _ => {
            state.cleanup.delete_url_opt(cover_url.as_deref()).await;
            return Err(AppError::BadRequest(
                "Title and content are required.".to_string(),
            ));
        }
    };

    let post = Post::new(identity.user_id, title, content, cover_url.clone());
    if let Err(e) = state.posts.save(post).await {
        state.cleanup.delete_url_opt(cover_url.as_deref()).await;
        return Err(e.into());
    }

    Ok(HttpResponse::Created().json(MessageResponse::new("Post created successfully.")))
}

/// GET /posts/{id}
pub async fn get_by_id(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))?;

    let authors = author_map(&state, std::slice::from_ref(&post)).await?;
    Ok(HttpResponse::Ok().json(post_response(&post, &authors)))
}

/// PUT /posts/{id} - author or admin only. Multipart like create; a new
/// cover image replaces the old one, which is cleaned up best-effort.
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let mut form = read_form(payload, "coverImage").await?;

    let uploaded_url = match form.file.take() {
        Some(file) => match state.images.upload(&file.filename, file.bytes).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::error!(error = %e, "Cover image upload failed");
                return Err(AppError::Internal("Cover image upload failed".to_string()));
            }
        },
        None => None,
    };

    let Some(mut post) = state.posts.find_by_id(id).await? else {
        state
            .cleanup
            .delete_url_opt(uploaded_url.as_deref())
            .await;
        return Err(AppError::NotFound("Post not found.".to_string()));
    };

    if !identity.role.can_mutate(identity.user_id, post.author_id) {
        state
            .cleanup
            .delete_url_opt(uploaded_url.as_deref())
            .await;
        return Err(AppError::Forbidden(
            "You do not have permission to update this post.".to_string(),
        ));
    }

    if let Some(title) = form.text("title") {
        post.title = title.to_string();
    }
    if let Some(content) = form.text("content") {
        post.content = content.to_string();
    }
    if let Some(url) = uploaded_url.clone() {
        state
            .cleanup
            .delete_url_opt(post.cover_image_url.as_deref())
            .await;
        post.cover_image_url = Some(url);
    }
    post.touch();

    if let Err(e) = state.posts.save(post).await {
        state
            .cleanup
            .delete_url_opt(uploaded_url.as_deref())
            .await;
        return Err(e.into());
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post updated successfully.")))
}

/// DELETE /posts/{id} - author or admin only. The cover image is cleaned
/// up first, best-effort; its failure never blocks the deletion.
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))?;

    if !identity.role.can_mutate(identity.user_id, post.author_id) {
        return Err(AppError::Forbidden(
            "You do not have permission to delete this post.".to_string(),
        ));
    }

    state
        .cleanup
        .delete_url_opt(post.cover_image_url.as_deref())
        .await;
    state.posts.delete(id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully.")))
}

/// POST /posts/{id}/reactions - toggle a like/dislike.
pub async fn react(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ReactionRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let kind: ReactionKind = body.kind.parse()?;

    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))?;

    post.reactions.toggle(identity.user_id, kind);
    post.touch();

    let post = state.posts.save(post).await?;

    Ok(HttpResponse::Ok().json(ReactionUpdateResponse {
        message: format!("Reaction '{kind}' updated successfully."),
        reactions: ReactionsResponse {
            likes: post.reactions.likes,
            dislikes: post.reactions.dislikes,
        },
    }))
}

/// POST /posts/{id}/comments
pub async fn add_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    if body.text.trim().is_empty() {
        return Err(AppError::BadRequest("Comment text is required.".to_string()));
    }

    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))?;

    let comment = post
        .add_comment(identity.user_id, body.text.clone())?
        .clone();
    state.posts.save(post).await?;

    let author = state.users.find_by_id(comment.author_id).await?;
    Ok(HttpResponse::Created().json(CommentUpdateResponse {
        message: "Comment added successfully.".to_string(),
        comment: CommentResponse::new(&comment, author.as_ref()),
    }))
}

/// PUT /posts/{post_id}/comments/{comment_id} - comment author or admin.
pub async fn update_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post_id, comment_id) = parse_comment_path(&post_id, &comment_id)?;
    if body.text.trim().is_empty() {
        return Err(AppError::BadRequest("Comment text is required.".to_string()));
    }

    let mut post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))?;

    let comment = post
        .update_comment(comment_id, identity.user_id, identity.role, body.text.clone())?
        .clone();
    state.posts.save(post).await?;

    let author = state.users.find_by_id(comment.author_id).await?;
    Ok(HttpResponse::Ok().json(CommentUpdateResponse {
        message: "Comment updated successfully.".to_string(),
        comment: CommentResponse::new(&comment, author.as_ref()),
    }))
}

/// DELETE /posts/{post_id}/comments/{comment_id} - comment author or admin.
pub async fn delete_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post_id, comment_id) = parse_comment_path(&post_id, &comment_id)?;

    let mut post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found.".to_string()))?;

    post.delete_comment(comment_id, identity.user_id, identity.role)?;
    state.posts.save(post).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Comment deleted successfully.")))
}

fn parse_comment_path(post_id: &str, comment_id: &str) -> Result<(Uuid, Uuid), AppError> {
    match (Uuid::parse_str(post_id), Uuid::parse_str(comment_id)) {
        (Ok(post_id), Ok(comment_id)) => Ok((post_id, comment_id)),
        _ => Err(AppError::BadRequest(
            "Invalid post or comment id.".to_string(),
        )),
    }
}
