//! Category listing handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use gazette_core::listing::{ListScope, PostQuery};
use gazette_core::pagination::PageRequest;
use gazette_shared::ApiResponse;
use gazette_shared::dto::{CategoryPostsResponse, ListQuery};

use crate::handlers::{category_response, page_response};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/categories/{slug}/posts
///
/// The category itself must be published; otherwise the whole listing is
/// missing, not merely empty.
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;

    let page = PageRequest::new(query.page.unwrap_or(1), state.page_size);
    let listing = state
        .posts
        .list(
            ListScope::Category(category.id),
            PostQuery::public_feed(),
            page,
            Utc::now(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryPostsResponse {
        category: category_response(category),
        posts: page_response(listing),
    })))
}
