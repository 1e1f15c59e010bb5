//! In-memory repositories - used as fallback when the database is not
//! configured, and as the test double for handler tests.
//!
//! Listing defers to the core predicate, comparator and paginator, so this
//! backend and the SQL backend share one definition of the pipeline.
//! Note: data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use gazette_core::domain::{Category, Comment, Location, Post, User};
use gazette_core::error::RepoError;
use gazette_core::listing::{self, ListScope, PostEntry, PostQuery, PostRelations};
use gazette_core::pagination::{Page, PageRequest, paginate};
use gazette_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, Repository,
    UserRepository,
};

/// Shared backing maps for the in-memory repositories.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    locations: RwLock<HashMap<Uuid, Location>>,
    posts: RwLock<HashMap<Uuid, Post>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

pub struct MemoryUserRepository(pub Arc<MemoryStore>);
pub struct MemoryCategoryRepository(pub Arc<MemoryStore>);
pub struct MemoryLocationRepository(pub Arc<MemoryStore>);
pub struct MemoryPostRepository(pub Arc<MemoryStore>);
pub struct MemoryCommentRepository(pub Arc<MemoryStore>);

macro_rules! memory_crud {
    ($repo:ident, $entity:ty, $field:ident) => {
        #[async_trait]
        impl Repository<$entity, Uuid> for $repo {
            async fn find_by_id(&self, id: Uuid) -> Result<Option<$entity>, RepoError> {
                Ok(self.0.$field.read().await.get(&id).cloned())
            }

            async fn insert(&self, entity: $entity) -> Result<$entity, RepoError> {
                let mut map = self.0.$field.write().await;
                if map.contains_key(&entity.id) {
                    return Err(RepoError::Constraint("duplicate id".to_string()));
                }
                map.insert(entity.id, entity.clone());
                Ok(entity)
            }

            async fn update(&self, entity: $entity) -> Result<$entity, RepoError> {
                let mut map = self.0.$field.write().await;
                if !map.contains_key(&entity.id) {
                    return Err(RepoError::NotFound);
                }
                map.insert(entity.id, entity.clone());
                Ok(entity)
            }

            async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
                self.0
                    .$field
                    .write()
                    .await
                    .remove(&id)
                    .map(|_| ())
                    .ok_or(RepoError::NotFound)
            }
        }
    };
}

memory_crud!(MemoryUserRepository, User, users);
memory_crud!(MemoryCategoryRepository, Category, categories);
memory_crud!(MemoryLocationRepository, Location, locations);

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .0
            .categories
            .read()
            .await
            .values()
            .find(|c| c.slug == slug && c.is_published)
            .cloned())
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationRepository {}

#[async_trait]
impl Repository<Post, Uuid> for MemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.0.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.0.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("duplicate id".to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.0.posts.write().await;
        if !posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.0.posts.write().await;
        posts.remove(&id).ok_or(RepoError::NotFound)?;
        // Mirror the schema's ON DELETE CASCADE for comments
        self.0
            .comments
            .write()
            .await
            .retain(|_, comment| comment.post_id != id);
        Ok(())
    }
}

fn relations_for(
    post: &Post,
    users: &HashMap<Uuid, User>,
    categories: &HashMap<Uuid, Category>,
    locations: &HashMap<Uuid, Location>,
) -> Option<PostRelations> {
    Some(PostRelations {
        author: users.get(&post.author_id)?.clone(),
        category: categories.get(&post.category_id)?.clone(),
        location: post.location_id.and_then(|id| locations.get(&id).cloned()),
    })
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn list(
        &self,
        scope: ListScope,
        query: PostQuery,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Page<PostEntry>, RepoError> {
        let posts = self.0.posts.read().await;
        let categories = self.0.categories.read().await;
        let locations = self.0.locations.read().await;
        let users = self.0.users.read().await;
        let comments = self.0.comments.read().await;

        let mut entries: Vec<PostEntry> = posts
            .values()
            .filter(|post| scope.matches(post))
            .filter(|post| {
                !query.apply_filters
                    || categories
                        .get(&post.category_id)
                        .is_some_and(|category| listing::is_publicly_visible(post, category, now))
            })
            .cloned()
            .map(|post| {
                let comment_count = query.annotate_comments.then(|| {
                    comments.values().filter(|c| c.post_id == post.id).count() as i64
                });
                let related = if query.select_related {
                    relations_for(&post, &users, &categories, &locations)
                } else {
                    None
                };
                PostEntry {
                    post,
                    comment_count,
                    related,
                }
            })
            .collect();

        if query.annotate_comments {
            entries.sort_by(listing::feed_order);
        }

        Ok(paginate(entries, page))
    }

    async fn find_visible_by_id(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let posts = self.0.posts.read().await;
        let categories = self.0.categories.read().await;

        Ok(posts
            .get(&id)
            .filter(|post| {
                categories
                    .get(&post.category_id)
                    .is_some_and(|category| listing::is_publicly_visible(post, category, now))
            })
            .cloned())
    }
}

#[async_trait]
impl Repository<Comment, Uuid> for MemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.0.comments.read().await.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        // Mirror the post_id foreign key
        if !self.0.posts.read().await.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("post does not exist".to_string()));
        }
        let mut comments = self.0.comments.write().await;
        if comments.contains_key(&comment.id) {
            return Err(RepoError::Constraint("duplicate id".to_string()));
        }
        comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.0.comments.write().await;
        if !comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0
            .comments
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut found: Vec<Comment> = self
            .0
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    struct Fixture {
        store: Arc<MemoryStore>,
        author: User,
        category: Category,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let author = User::new("alice".into(), "alice@example.com".into(), "hash".into());
        let category = Category::new("Travel".into(), "travel".into());
        store
            .users
            .write()
            .await
            .insert(author.id, author.clone());
        store
            .categories
            .write()
            .await
            .insert(category.id, category.clone());
        Fixture {
            store,
            author,
            category,
        }
    }

    fn post_at(fix: &Fixture, pub_date: DateTime<Utc>) -> Post {
        Post::new(
            fix.author.id,
            fix.category.id,
            None,
            "Title".into(),
            "Text".into(),
            pub_date,
        )
    }

    async fn seed_post(fix: &Fixture, post: &Post) {
        fix.store
            .posts
            .write()
            .await
            .insert(post.id, post.clone());
    }

    #[tokio::test]
    async fn public_feed_honors_the_visibility_invariant() {
        let fix = fixture().await;
        let now = Utc::now();

        let visible = post_at(&fix, now - TimeDelta::hours(1));
        let mut unpublished = post_at(&fix, now - TimeDelta::hours(1));
        unpublished.is_published = false;
        let scheduled = post_at(&fix, now + TimeDelta::hours(1));

        let hidden_category = Category {
            is_published: false,
            ..Category::new("Drafts".into(), "drafts".into())
        };
        fix.store
            .categories
            .write()
            .await
            .insert(hidden_category.id, hidden_category.clone());
        let mut in_hidden_category = post_at(&fix, now - TimeDelta::hours(1));
        in_hidden_category.category_id = hidden_category.id;

        for post in [&visible, &unpublished, &scheduled, &in_hidden_category] {
            seed_post(&fix, post).await;
        }

        let repo = MemoryPostRepository(fix.store.clone());
        let page = repo
            .list(
                ListScope::All,
                PostQuery::public_feed(),
                PageRequest::first(10),
                now,
            )
            .await
            .unwrap();

        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].post.id, visible.id);
    }

    #[tokio::test]
    async fn unfiltered_author_scope_includes_hidden_posts() {
        let fix = fixture().await;
        let now = Utc::now();

        let mut draft = post_at(&fix, now - TimeDelta::hours(1));
        draft.is_published = false;
        seed_post(&fix, &draft).await;

        let repo = MemoryPostRepository(fix.store.clone());
        let page = repo
            .list(
                ListScope::Author(fix.author.id),
                PostQuery::feed_with_filters(false),
                PageRequest::first(10),
                now,
            )
            .await
            .unwrap();

        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].post.id, draft.id);
    }

    #[tokio::test]
    async fn annotated_feed_orders_by_date_then_comment_count() {
        let fix = fixture().await;
        let now = Utc::now();
        let tied = now - TimeDelta::days(1);

        let newest = post_at(&fix, now - TimeDelta::hours(1));
        let tied_busy = post_at(&fix, tied);
        let tied_quiet = post_at(&fix, tied);
        for post in [&newest, &tied_busy, &tied_quiet] {
            seed_post(&fix, post).await;
        }
        for _ in 0..3 {
            let comment = Comment::new(tied_busy.id, fix.author.id, "hi".into());
            fix.store
                .comments
                .write()
                .await
                .insert(comment.id, comment);
        }

        let repo = MemoryPostRepository(fix.store.clone());
        let page = repo
            .list(
                ListScope::All,
                PostQuery::public_feed(),
                PageRequest::first(10),
                now,
            )
            .await
            .unwrap();

        let ids: Vec<Uuid> = page.items.iter().map(|e| e.post.id).collect();
        assert_eq!(ids, vec![newest.id, tied_busy.id, tied_quiet.id]);
        assert_eq!(page.items[1].comment_count, Some(3));
    }

    #[tokio::test]
    async fn select_related_attaches_author_and_category() {
        let fix = fixture().await;
        let now = Utc::now();
        let post = post_at(&fix, now - TimeDelta::hours(1));
        seed_post(&fix, &post).await;

        let repo = MemoryPostRepository(fix.store.clone());
        let page = repo
            .list(
                ListScope::All,
                PostQuery::public_feed(),
                PageRequest::first(10),
                now,
            )
            .await
            .unwrap();

        let related = page.items[0].related.as_ref().unwrap();
        assert_eq!(related.author.id, fix.author.id);
        assert_eq!(related.category.id, fix.category.id);
        assert!(related.location.is_none());
    }

    #[tokio::test]
    async fn listing_slices_pagination_windows() {
        let fix = fixture().await;
        let now = Utc::now();
        for i in 0..12 {
            let post = post_at(&fix, now - TimeDelta::hours(i + 1));
            seed_post(&fix, &post).await;
        }

        let repo = MemoryPostRepository(fix.store.clone());
        let page = repo
            .list(
                ListScope::All,
                PostQuery::public_feed(),
                PageRequest::new(2, 10),
                now,
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn find_visible_by_id_hides_filtered_posts() {
        let fix = fixture().await;
        let now = Utc::now();

        let visible = post_at(&fix, now - TimeDelta::hours(1));
        let mut draft = post_at(&fix, now - TimeDelta::hours(1));
        draft.is_published = false;
        seed_post(&fix, &visible).await;
        seed_post(&fix, &draft).await;

        let repo = MemoryPostRepository(fix.store.clone());
        assert!(
            repo.find_visible_by_id(visible.id, now)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            repo.find_visible_by_id(draft.id, now)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.find_visible_by_id(Uuid::new_v4(), now)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn comment_insert_requires_existing_post() {
        let fix = fixture().await;
        let repo = MemoryCommentRepository(fix.store.clone());

        let orphan = Comment::new(Uuid::new_v4(), fix.author.id, "hi".into());
        let err = repo.insert(orphan).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert!(fix.store.comments.read().await.is_empty());
    }

    #[tokio::test]
    async fn comments_list_in_creation_order() {
        let fix = fixture().await;
        let now = Utc::now();
        let post = post_at(&fix, now);
        seed_post(&fix, &post).await;

        let repo = MemoryCommentRepository(fix.store.clone());
        let mut expected = Vec::new();
        for i in 0..3 {
            let mut comment = Comment::new(post.id, fix.author.id, format!("c{i}"));
            comment.created_at = now + TimeDelta::seconds(i);
            expected.push(comment.id);
            repo.insert(comment).await.unwrap();
        }

        let listed: Vec<Uuid> = repo
            .list_by_post(post.id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_to_its_comments() {
        let fix = fixture().await;
        let now = Utc::now();
        let post = post_at(&fix, now);
        seed_post(&fix, &post).await;

        let comments = MemoryCommentRepository(fix.store.clone());
        comments
            .insert(Comment::new(post.id, fix.author.id, "hi".into()))
            .await
            .unwrap();

        let posts = MemoryPostRepository(fix.store.clone());
        Repository::<Post, Uuid>::delete(&posts, post.id)
            .await
            .unwrap();

        assert!(fix.store.comments.read().await.is_empty());
    }
}
