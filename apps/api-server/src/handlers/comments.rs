//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use gazette_core::domain::Comment;
use gazette_core::policy::{Access, Action, authorize};
use gazette_shared::ApiResponse;
use gazette_shared::dto::{NewCommentRequest, UpdateCommentRequest};

use crate::handlers::{comment_response, redirect_to_post};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("comment not found".to_string())
}

/// POST /api/posts/{post_id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<NewCommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    if req.text.trim().is_empty() {
        return Err(AppError::Validation(vec![
            "text must not be empty".to_string(),
        ]));
    }

    // Existence only; commenting does not require public visibility.
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;

    let comment = Comment::new(post.id, identity.user_id, req.text);
    let comment = state.comments.insert(comment).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment_response(comment))))
}

/// PUT /api/posts/{post_id}/comments/{comment_id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or_else(not_found)?;
    if comment.post_id != post_id {
        return Err(not_found());
    }

    if let Access::RedirectToPost(id) = authorize(identity.user_id, &comment, Action::Update) {
        return Ok(redirect_to_post(id));
    }

    let req = body.into_inner();
    if req.text.trim().is_empty() {
        return Err(AppError::Validation(vec![
            "text must not be empty".to_string(),
        ]));
    }
    comment.text = req.text;

    let comment = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment_response(comment))))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or_else(not_found)?;
    if comment.post_id != post_id {
        return Err(not_found());
    }

    if let Access::RedirectToPost(id) = authorize(identity.user_id, &comment, Action::Delete) {
        return Ok(redirect_to_post(id));
    }

    state.comments.delete(comment_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
