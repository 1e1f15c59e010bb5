//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod posts;
mod profiles;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, web};
use uuid::Uuid;

use gazette_core::domain::{Category, Comment, Location, Post, User};
use gazette_core::listing::PostEntry;
use gazette_core::pagination::Page;
use gazette_shared::dto::{
    CategoryResponse, CommentResponse, LocationResponse, PageResponse, PostResponse, UserResponse,
};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Posts and their comments
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::index))
                    .route("", web::post().to(posts::create))
                    .route("/{post_id}", web::get().to(posts::detail))
                    .route("/{post_id}", web::put().to(posts::update))
                    .route("/{post_id}", web::delete().to(posts::delete))
                    .route("/{post_id}/comments", web::post().to(comments::create))
                    .route(
                        "/{post_id}/comments/{comment_id}",
                        web::put().to(comments::update),
                    )
                    .route(
                        "/{post_id}/comments/{comment_id}",
                        web::delete().to(comments::delete),
                    ),
            )
            // Category listings
            .route("/categories/{slug}/posts", web::get().to(categories::posts))
            // Profiles
            .service(
                web::scope("/profiles")
                    .route("/me", web::put().to(profiles::update_me))
                    .route("/{username}", web::get().to(profiles::show)),
            ),
    );
}

/// Canonical detail route for a post.
pub(crate) fn post_detail_path(post_id: Uuid) -> String {
    format!("/api/posts/{post_id}")
}

/// Soft permission denial: send the actor to the canonical read view
/// instead of answering with an error.
pub(crate) fn redirect_to_post(post_id: Uuid) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, post_detail_path(post_id)))
        .finish()
}

pub(crate) fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        created_at: user.created_at,
    }
}

pub(crate) fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title,
        slug: category.slug,
        is_published: category.is_published,
    }
}

pub(crate) fn location_response(location: Location) -> LocationResponse {
    LocationResponse {
        id: location.id,
        name: location.name,
    }
}

pub(crate) fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        text: comment.text,
        created_at: comment.created_at,
    }
}

pub(crate) fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        category_id: post.category_id,
        location_id: post.location_id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        created_at: post.created_at,
        comment_count: None,
        author: None,
        category: None,
        location: None,
    }
}

pub(crate) fn entry_response(entry: PostEntry) -> PostResponse {
    let mut response = post_response(entry.post);
    response.comment_count = entry.comment_count;
    if let Some(related) = entry.related {
        response.author = Some(user_response(related.author));
        response.category = Some(category_response(related.category));
        response.location = related.location.map(location_response);
    }
    response
}

pub(crate) fn page_response(page: Page<PostEntry>) -> PageResponse<PostResponse> {
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    PageResponse {
        page: page.number,
        size: page.size,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next,
        has_previous,
        items: page.items.into_iter().map(entry_response).collect(),
    }
}
