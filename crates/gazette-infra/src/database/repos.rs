//! PostgreSQL repository implementations.
//!
//! The listing pipeline translates a `PostQuery` into SQL in its fixed
//! sequence: scope, visibility predicate, count, annotation/order,
//! pagination window, then batched eager loading of related rows.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use gazette_core::domain::{Category, Comment, Location, Post, User};
use gazette_core::error::RepoError;
use gazette_core::listing::{ListScope, PostEntry, PostQuery, PostRelations};
use gazette_core::pagination::{Page, PageRequest};
use gazette_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

use super::entity::{category, comment, location, post, user};
use super::seaorm_base::{SeaOrmRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = SeaOrmRepository<user::Entity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = SeaOrmRepository<category::Entity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = SeaOrmRepository<location::Entity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = SeaOrmRepository<post::Entity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = SeaOrmRepository<comment::Entity>;

/// Post row extended with the aggregated comment count.
#[derive(FromQueryResult)]
struct AnnotatedPost {
    id: Uuid,
    author_id: Uuid,
    category_id: Uuid,
    location_id: Option<Uuid>,
    title: String,
    text: String,
    pub_date: DateTimeWithTimeZone,
    is_published: bool,
    created_at: DateTimeWithTimeZone,
    comment_count: i64,
}

impl From<AnnotatedPost> for PostEntry {
    fn from(row: AnnotatedPost) -> Self {
        PostEntry {
            post: Post {
                id: row.id,
                author_id: row.author_id,
                category_id: row.category_id,
                location_id: row.location_id,
                title: row.title,
                text: row.text,
                pub_date: row.pub_date.into(),
                is_published: row.is_published,
                created_at: row.created_at.into(),
            },
            comment_count: Some(row.comment_count),
            related: None,
        }
    }
}

fn scoped(scope: ListScope) -> Select<post::Entity> {
    let select = post::Entity::find();
    match scope {
        ListScope::All => select,
        ListScope::Category(id) => select.filter(post::Column::CategoryId.eq(id)),
        ListScope::Author(id) => select.filter(post::Column::AuthorId.eq(id)),
    }
}

/// The visibility invariant in SQL: published post, published category,
/// publish date not in the future.
fn apply_visibility(select: Select<post::Entity>, now: DateTime<Utc>) -> Select<post::Entity> {
    select
        .join(JoinType::InnerJoin, post::Relation::Category.def())
        .filter(post::Column::IsPublished.eq(true))
        .filter(category::Column::IsPublished.eq(true))
        .filter(post::Column::PubDate.lte(now))
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(
        &self,
        scope: ListScope,
        query: PostQuery,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Page<PostEntry>, RepoError> {
        let mut select = scoped(scope);
        if query.apply_filters {
            select = apply_visibility(select, now);
        }

        let total = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let window = page.resolve(total);

        let mut entries: Vec<PostEntry> = if query.annotate_comments {
            select
                .join(JoinType::LeftJoin, post::Relation::Comment.def())
                .column_as(comment::Column::Id.count(), "comment_count")
                .group_by(post::Column::Id)
                .order_by_desc(post::Column::PubDate)
                .order_by_desc(comment::Column::Id.count())
                .offset(window.offset)
                .limit(window.size)
                .into_model::<AnnotatedPost>()
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(Into::into)
                .collect()
        } else {
            select
                .offset(window.offset)
                .limit(window.size)
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|model| PostEntry {
                    post: model.into(),
                    comment_count: None,
                    related: None,
                })
                .collect()
        };

        if query.select_related {
            self.load_relations(&mut entries).await?;
        }

        Ok(Page::new(entries, window))
    }

    async fn find_visible_by_id(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let found = apply_visibility(post::Entity::find_by_id(id), now)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(found.map(Into::into))
    }
}

impl PostgresPostRepository {
    /// Batched eager loading of category, location and author rows for a
    /// fetched page.
    async fn load_relations(&self, entries: &mut [PostEntry]) -> Result<(), RepoError> {
        if entries.is_empty() {
            return Ok(());
        }

        let category_ids: HashSet<Uuid> = entries.iter().map(|e| e.post.category_id).collect();
        let author_ids: HashSet<Uuid> = entries.iter().map(|e| e.post.author_id).collect();
        let location_ids: HashSet<Uuid> =
            entries.iter().filter_map(|e| e.post.location_id).collect();

        let categories: HashMap<Uuid, Category> = category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        let authors: HashMap<Uuid, User> = user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            location::Entity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        for entry in entries.iter_mut() {
            let author = authors.get(&entry.post.author_id);
            let category = categories.get(&entry.post.category_id);
            if let (Some(author), Some(category)) = (author, category) {
                entry.related = Some(PostRelations {
                    author: author.clone(),
                    category: category.clone(),
                    location: entry
                        .post
                        .location_id
                        .and_then(|id| locations.get(&id).cloned()),
                });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let found = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(found.map(Into::into))
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let head: String = local.chars().take(1).collect();
            format!("{head}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask the local part so no PII lands in logs
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(found.map(Into::into))
    }
}
