use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, Post, User};
use crate::error::RepoError;
use crate::listing::{ListScope, PostEntry, PostQuery};
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository: CRUD plus the listing pipeline.
#[async_trait]
pub trait PostRepository: Repository<Post, Uuid> {
    /// Build a post listing: restrict to `scope`, apply the query switches
    /// in their fixed sequence, then slice the pagination window.
    async fn list(
        &self,
        scope: ListScope,
        query: PostQuery,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Page<PostEntry>, RepoError>;

    /// Resolve a single post through the visibility filter. `None` covers
    /// both missing and hidden posts.
    async fn find_visible_by_id(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: Repository<Category, Uuid> {
    /// Resolve a category by slug, requiring it to be published.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Location repository.
#[async_trait]
pub trait LocationRepository: Repository<Location, Uuid> {}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Repository<Comment, Uuid> {
    /// Comments of a post in creation order.
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// User repository with lookup by credentials-bearing identifiers.
#[async_trait]
pub trait UserRepository: Repository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}
