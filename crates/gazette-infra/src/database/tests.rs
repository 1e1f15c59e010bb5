//! MockDatabase coverage for the SeaORM repositories.

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use gazette_core::domain::{Comment, Post};
use gazette_core::error::RepoError;
use gazette_core::ports::{CategoryRepository, Repository};

use super::entity::{category, post};
use super::repos::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
};

#[tokio::test]
async fn find_post_by_id_maps_to_domain() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            author_id,
            category_id: Uuid::new_v4(),
            location_id: None,
            title: "Test Post".to_owned(),
            text: "Content".to_owned(),
            pub_date: now.into(),
            is_published: true,
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let found: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let found = found.unwrap();
    assert_eq!(found.id, post_id);
    assert_eq!(found.title, "Test Post");
    assert_eq!(found.author_id, author_id);
}

#[tokio::test]
async fn category_slug_lookup_maps_to_domain() {
    let category_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![category::Model {
            id: category_id,
            title: "Travel".to_owned(),
            slug: "travel".to_owned(),
            is_published: true,
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);

    let found = repo.find_published_by_slug("travel").await.unwrap().unwrap();
    assert_eq!(found.id, category_id);
    assert_eq!(found.slug, "travel");
}

#[tokio::test]
async fn deleting_a_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let err = Repository::<Comment, Uuid>::delete(&repo, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}
