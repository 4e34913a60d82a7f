//! User handlers: listing, profile update, and cascading deletion.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use fable_shared::dto::{MessageResponse, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::upload::read_form;

fn parse_user_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::BadRequest("Invalid user id.".to_string()))
}

/// GET /users
pub async fn list(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = state.users.find_all().await?;
    let users: Vec<UserResponse> = users.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(users))
}

/// PUT /users - update the authenticated user's profile.
///
/// Multipart body: optional `fullName` and `email` text fields, optional
/// `avatar` image. A new avatar replaces the old one, which is cleaned up
/// best-effort.
pub async fn update_me(
    identity: Identity,
    state: web::Data<AppState>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, "avatar").await?;

    // Upload before anything else, mirroring the storage-first flow; if the
    // request turns out to be invalid the fresh upload is cleaned up.
    let uploaded_url = match form.file.take() {
        Some(file) => match state.images.upload(&file.filename, file.bytes).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::error!(error = %e, "Avatar upload failed");
                return Err(AppError::Internal("Avatar upload failed".to_string()));
            }
        },
        None => None,
    };

    let Some(mut user) = state.users.find_by_id(identity.user_id).await? else {
        state
            .cleanup
            .delete_url_opt(uploaded_url.as_deref())
            .await;
        return Err(AppError::NotFound("User not found.".to_string()));
    };

    if let Some(full_name) = form.text("fullName") {
        user.full_name = full_name.to_string();
    }
    if let Some(email) = form.text("email") {
        user.email = email.to_lowercase();
    }
    if let Some(url) = uploaded_url {
        state
            .cleanup
            .delete_url_opt(user.avatar_url.as_deref())
            .await;
        user.avatar_url = Some(url);
    }
    user.updated_at = Utc::now();

    state.users.save(user).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("User updated successfully.")))
}

/// GET /users/{id}
pub async fn get_by_id(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_user_id(&path)?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /users/{id} - self or admin only.
///
/// Cascade: the user's avatar, every owned post's cover image, the posts
/// themselves, then the user. Image cleanup is best-effort and never fails
/// the deletion; the database steps are not transactional (accepted
/// limitation).
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let target_id = parse_user_id(&path)?;

    if !identity.role.can_mutate(identity.user_id, target_id) {
        return Err(AppError::Forbidden(
            "You do not have permission to delete this user.".to_string(),
        ));
    }

    let user = state
        .users
        .find_by_id(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    state
        .cleanup
        .delete_url_opt(user.avatar_url.as_deref())
        .await;

    let posts = state.posts.find_by_author(target_id).await?;
    for post in &posts {
        state
            .cleanup
            .delete_url_opt(post.cover_image_url.as_deref())
            .await;
    }

    let deleted = state.posts.delete_by_author(target_id).await?;
    state.users.delete(target_id).await?;

    tracing::info!(user_id = %target_id, posts = deleted, "Deleted user and their posts");

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "User and their posts deleted successfully.",
    )))
}
