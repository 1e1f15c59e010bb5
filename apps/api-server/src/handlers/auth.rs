//! Authentication handlers.

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use gazette_core::domain::User;
use gazette_core::ports::{PasswordService, TokenService};
use gazette_shared::ApiResponse;
use gazette_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use crate::handlers::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    let mut problems = Vec::new();
    if req.username.trim().is_empty() {
        problems.push("username must not be empty".to_string());
    }
    if req.email.is_empty() || !req.email.contains('@') {
        problems.push("invalid email address".to_string());
    }
    if req.password.len() < 8 {
        problems.push("password must be at least 8 characters".to_string());
    }
    if !problems.is_empty() {
        return Err(AppError::Validation(problems));
    }

    // Check if the user already exists
    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("username already taken".to_string()));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("email already registered".to_string()));
    }

    let password_hash = password_service.hash(&req.password)?;

    let mut user = User::new(req.username, req.email, password_hash);
    if let Some(first_name) = req.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name;
    }
    let user = state.users.insert(user).await?;

    let token = token_service.generate_token(user.id, &user.username)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = token_service.generate_token(user.id, &user.username)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(user))))
}
