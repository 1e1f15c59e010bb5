//! Profile handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use gazette_core::listing::{ListScope, PostQuery};
use gazette_core::pagination::PageRequest;
use gazette_shared::ApiResponse;
use gazette_shared::dto::{ListQuery, ProfileResponse, UpdateProfileRequest};

use crate::handlers::{page_response, user_response};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/profiles/{username}
///
/// Owners see all of their posts; everyone else gets the filtered set.
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    let is_owner = identity.0.as_ref().is_some_and(|i| i.user_id == user.id);
    let page = PageRequest::new(query.page.unwrap_or(1), state.page_size);
    let listing = state
        .posts
        .list(
            ListScope::Author(user.id),
            PostQuery::feed_with_filters(!is_owner),
            page,
            Utc::now(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfileResponse {
        profile: user_response(user),
        posts: page_response(listing),
    })))
}

/// PUT /api/profiles/me
pub async fn update_me(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    let req = body.into_inner();
    if let Some(username) = req.username {
        if username.trim().is_empty() {
            return Err(AppError::Validation(vec![
                "username must not be empty".to_string(),
            ]));
        }
        if username != user.username
            && state.users.find_by_username(&username).await?.is_some()
        {
            return Err(AppError::Conflict("username already taken".to_string()));
        }
        user.username = username;
    }
    if let Some(email) = req.email {
        if !email.contains('@') {
            return Err(AppError::Validation(vec![
                "invalid email address".to_string(),
            ]));
        }
        user.email = email;
    }
    if let Some(first_name) = req.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name;
    }

    let user = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(user))))
}
