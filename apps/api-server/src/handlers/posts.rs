//! Post handlers: the public feed, detail, and owner-scoped mutations.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use gazette_core::domain::Post;
use gazette_core::listing::{ListScope, PostQuery};
use gazette_core::pagination::PageRequest;
use gazette_core::policy::{Access, Action, authorize};
use gazette_shared::ApiResponse;
use gazette_shared::dto::{ListQuery, NewPostRequest, PostDetailResponse, UpdatePostRequest};

use crate::handlers::{comment_response, page_response, post_response, redirect_to_post};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("post not found".to_string())
}

/// GET /api/posts - the public feed.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(query.page.unwrap_or(1), state.page_size);
    let listing = state
        .posts
        .list(ListScope::All, PostQuery::public_feed(), page, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page_response(listing))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<NewPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut problems = Vec::new();
    if req.title.trim().is_empty() {
        problems.push("title must not be empty".to_string());
    }
    if req.text.trim().is_empty() {
        problems.push("text must not be empty".to_string());
    }
    if state.categories.find_by_id(req.category_id).await?.is_none() {
        problems.push("unknown category".to_string());
    }
    if let Some(location_id) = req.location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            problems.push("unknown location".to_string());
        }
    }
    if !problems.is_empty() {
        return Err(AppError::Validation(problems));
    }

    let mut post = Post::new(
        identity.user_id,
        req.category_id,
        req.location_id,
        req.title,
        req.text,
        req.pub_date,
    );
    post.is_published = req.is_published;
    let post = state.posts.insert(post).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(post))))
}

/// GET /api/posts/{post_id}
///
/// The author sees their post unfiltered; any other requester re-resolves
/// it through the visibility filter, so a hidden post reads as missing.
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(not_found)?;

    let post = if identity.0.as_ref().is_some_and(|i| i.user_id == post.author_id) {
        post
    } else {
        state
            .posts
            .find_visible_by_id(post_id, Utc::now())
            .await?
            .ok_or_else(not_found)?
    };

    let comments = state.comments.list_by_post(post.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailResponse {
        post: post_response(post),
        comments: comments.into_iter().map(comment_response).collect(),
    })))
}

/// PUT /api/posts/{post_id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let mut post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(not_found)?;

    if let Access::RedirectToPost(id) = authorize(identity.user_id, &post, Action::Update) {
        return Ok(redirect_to_post(id));
    }

    let req = body.into_inner();
    if let Some(category_id) = req.category_id {
        if state.categories.find_by_id(category_id).await?.is_none() {
            return Err(AppError::Validation(vec!["unknown category".to_string()]));
        }
        post.category_id = category_id;
    }
    if let Some(location_id) = req.location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            return Err(AppError::Validation(vec!["unknown location".to_string()]));
        }
        post.location_id = Some(location_id);
    }
    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation(vec![
                "title must not be empty".to_string(),
            ]));
        }
        post.title = title;
    }
    if let Some(text) = req.text {
        post.text = text;
    }
    if let Some(pub_date) = req.pub_date {
        post.pub_date = pub_date;
    }
    if let Some(is_published) = req.is_published {
        post.is_published = is_published;
    }

    let post = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// DELETE /api/posts/{post_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(not_found)?;

    if let Access::RedirectToPost(id) = authorize(identity.user_id, &post, Action::Delete) {
        return Ok(redirect_to_post(id));
    }

    state.posts.delete(post_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
