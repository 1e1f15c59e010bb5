//! Handler tests over the in-memory repositories.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use gazette_core::domain::{Category, Post, User};
use gazette_core::ports::{PasswordService, TokenService};
use gazette_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

use crate::state::AppState;

fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "test".to_string(),
    }))
}

fn bearer(tokens: &Arc<dyn TokenService>, user: &User) -> (header::HeaderName, String) {
    let token = tokens.generate_token(user.id, &user.username).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn seed_user(state: &AppState, username: &str) -> User {
    let user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        "hash".to_string(),
    );
    state.users.insert(user.clone()).await.unwrap();
    user
}

async fn seed_category(state: &AppState) -> Category {
    let category = Category::new("Travel".to_string(), "travel".to_string());
    state.categories.insert(category.clone()).await.unwrap();
    category
}

async fn seed_post(state: &AppState, author: &User, category: &Category, published: bool) -> Post {
    let mut post = Post::new(
        author.id,
        category.id,
        None,
        "Title".to_string(),
        "Text".to_string(),
        Utc::now() - TimeDelta::hours(1),
    );
    post.is_published = published;
    state.posts.insert(post.clone()).await.unwrap();
    post
}

#[actix_rt::test]
async fn stranger_update_redirects_to_detail_and_preserves_post() {
    let state = AppState::in_memory(10);
    let tokens = token_service();
    let author = seed_user(&state, "alice").await;
    let stranger = seed_user(&state, "mallory").await;
    let category = seed_category(&state).await;
    let post = seed_post(&state, &author, &category, true).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(super::configure_routes),
    )
    .await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header(bearer(&tokens, &stranger))
        .set_json(serde_json::json!({ "title": "hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(location, format!("/api/posts/{}", post.id));

    let unchanged = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Title");
}

#[actix_rt::test]
async fn stranger_delete_redirects_and_post_survives() {
    let state = AppState::in_memory(10);
    let tokens = token_service();
    let author = seed_user(&state, "alice").await;
    let stranger = seed_user(&state, "mallory").await;
    let category = seed_category(&state).await;
    let post = seed_post(&state, &author, &category, true).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(super::configure_routes),
    )
    .await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header(bearer(&tokens, &stranger))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(state.posts.find_by_id(post.id).await.unwrap().is_some());
}

#[actix_rt::test]
async fn detail_hides_drafts_from_everyone_but_the_author() {
    let state = AppState::in_memory(10);
    let tokens = token_service();
    let author = seed_user(&state, "alice").await;
    let stranger = seed_user(&state, "bob").await;
    let category = seed_category(&state).await;
    let draft = seed_post(&state, &author, &category, false).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(super::configure_routes),
    )
    .await;

    let as_author = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", draft.id))
        .insert_header(bearer(&tokens, &author))
        .to_request();
    assert_eq!(
        test::call_service(&app, as_author).await.status(),
        StatusCode::OK
    );

    let as_stranger = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", draft.id))
        .insert_header(bearer(&tokens, &stranger))
        .to_request();
    assert_eq!(
        test::call_service(&app, as_stranger).await.status(),
        StatusCode::NOT_FOUND
    );

    let anonymous = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", draft.id))
        .to_request();
    assert_eq!(
        test::call_service(&app, anonymous).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn comment_on_missing_post_is_not_found_and_persists_nothing() {
    let state = AppState::in_memory(10);
    let tokens = token_service();
    let user = seed_user(&state, "alice").await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(super::configure_routes),
    )
    .await;

    let missing = Uuid::new_v4();
    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{missing}/comments"))
        .insert_header(bearer(&tokens, &user))
        .set_json(serde_json::json!({ "text": "first!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(
        state
            .comments
            .list_by_post(missing)
            .await
            .unwrap()
            .is_empty()
    );
}

#[actix_rt::test]
async fn index_lists_only_publicly_visible_posts() {
    let state = AppState::in_memory(10);
    let tokens = token_service();
    let author = seed_user(&state, "alice").await;
    let category = seed_category(&state).await;
    let visible = seed_post(&state, &author, &category, true).await;
    let _draft = seed_post(&state, &author, &category, false).await;
    let mut scheduled = Post::new(
        author.id,
        category.id,
        None,
        "Later".to_string(),
        "Text".to_string(),
        Utc::now() + TimeDelta::hours(2),
    );
    scheduled.is_published = true;
    state.posts.insert(scheduled).await.unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(super::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], visible.id.to_string());
    assert_eq!(items[0]["author"]["username"], "alice");
}

#[actix_rt::test]
async fn mutations_require_authentication() {
    let state = AppState::in_memory(10);
    let tokens = token_service();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(super::configure_routes),
    )
    .await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", Uuid::new_v4()))
        .set_json(serde_json::json!({ "title": "nope" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn register_then_login_round_trip() {
    let state = AppState::in_memory(10);
    let tokens = token_service();
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::Data::new(passwords.clone()))
            .configure(super::configure_routes),
    )
    .await;

    let register = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct-horse-battery"
        }))
        .to_request();
    let resp = test::call_service(&app, register).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({
            "username": "alice",
            "password": "correct-horse-battery"
        }))
        .to_request();
    let resp = test::call_service(&app, login).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(!body["access_token"].as_str().unwrap().is_empty());

    let wrong = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({
            "username": "alice",
            "password": "wrong-password"
        }))
        .to_request();
    let resp = test::call_service(&app, wrong).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn own_profile_includes_drafts_for_the_owner_only() {
    let state = AppState::in_memory(10);
    let tokens = token_service();
    let author = seed_user(&state, "alice").await;
    let category = seed_category(&state).await;
    let _published = seed_post(&state, &author, &category, true).await;
    let _draft = seed_post(&state, &author, &category, false).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(super::configure_routes),
    )
    .await;

    let as_owner = test::TestRequest::get()
        .uri("/api/profiles/alice")
        .insert_header(bearer(&tokens, &author))
        .to_request();
    let resp = test::call_service(&app, as_owner).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["posts"]["total_items"], 2);

    let anonymous = test::TestRequest::get()
        .uri("/api/profiles/alice")
        .to_request();
    let resp = test::call_service(&app, anonymous).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["posts"]["total_items"], 1);
}
