//! Authentication handlers - the only routes that skip the access guard.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use fable_core::domain::User;
use fable_core::ports::{PasswordService, TokenService};
use fable_shared::dto::{AuthResponse, SignInRequest, SignUpRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /auth/sign-up
pub async fn sign_up(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<SignUpRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.full_name.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "All fields (fullName, email, password) are required.".to_string(),
        ));
    }
    if req.full_name.trim().len() < 4 {
        return Err(AppError::BadRequest(
            "Full name must be at least 4 characters.".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address.".to_string()));
    }
    if req.password.len() < 6 || req.password.len() > 20 {
        return Err(AppError::BadRequest(
            "Password must be between 6 and 20 characters.".to_string(),
        ));
    }

    let email = req.email.to_lowercase();
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest(
            "A user with this email already exists.".to_string(),
        ));
    }

    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = User::new(req.full_name, email, password_hash);
    let saved = state.users.save(user).await?;

    let token = token_service
        .issue(saved.id, saved.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully.".to_string(),
        token,
        user_id: saved.id,
        role: saved.role,
    }))
}

/// POST /auth/sign-in
pub async fn sign_in(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<SignInRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }

    // The same response for "no such user" and "wrong password" prevents
    // account enumeration.
    let user = state
        .users
        .find_by_email(&req.email.to_lowercase())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid credentials.".to_string()))?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::BadRequest("Invalid credentials.".to_string()));
    }

    let token = token_service
        .issue(user.id, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Signed in successfully.".to_string(),
        token,
        user_id: user.id,
        role: user.role,
    }))
}
