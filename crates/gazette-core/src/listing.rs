//! The post visibility and listing pipeline.
//!
//! A listing is described by an explicit [`PostQuery`] value instead of a
//! chain of storage calls, so every backend applies the same steps in the
//! same sequence: visibility predicate, eager loading of related rows,
//! comment annotation and ordering. The predicate and the feed comparator
//! live here as pure functions; both the SQL and the in-memory backends
//! defer to them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Location, Post, User};

/// Switches controlling how a post listing is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostQuery {
    /// Restrict to posts satisfying the public-visibility invariant.
    /// Callers pass `false` when the requester is the author.
    pub apply_filters: bool,
    /// Eagerly load category, location and author for each returned post.
    /// Affects access-pattern efficiency only, never the result set.
    pub select_related: bool,
    /// Attach a comment count per post and order the result by publish
    /// date descending, comment count descending. When `false` this
    /// component imposes no ordering.
    pub annotate_comments: bool,
}

impl PostQuery {
    /// Full public feed: filtered, related rows loaded, counts attached.
    pub fn public_feed() -> Self {
        Self {
            apply_filters: true,
            select_related: true,
            annotate_comments: true,
        }
    }

    /// Visibility check only; no joins, no annotation, no ordering.
    pub fn visibility_only() -> Self {
        Self {
            apply_filters: true,
            select_related: false,
            annotate_comments: false,
        }
    }

    /// Feed with the visibility filter switched by the caller, e.g. a
    /// profile listing where the owner sees unpublished posts.
    pub fn feed_with_filters(apply_filters: bool) -> Self {
        Self {
            apply_filters,
            select_related: true,
            annotate_comments: true,
        }
    }
}

/// Which slice of the post table a listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Category(Uuid),
    Author(Uuid),
}

impl ListScope {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            ListScope::All => true,
            ListScope::Category(id) => post.category_id == *id,
            ListScope::Author(id) => post.author_id == *id,
        }
    }
}

/// The public-visibility invariant: published, in a published category,
/// publish date not in the future.
pub fn is_publicly_visible(post: &Post, category: &Category, now: DateTime<Utc>) -> bool {
    post.is_published && category.is_published && post.pub_date <= now
}

/// One row of a post listing.
#[derive(Debug, Clone)]
pub struct PostEntry {
    pub post: Post,
    /// Present iff the query asked for comment annotation.
    pub comment_count: Option<i64>,
    /// Present iff the query asked for related rows.
    pub related: Option<PostRelations>,
}

/// Related rows loaded for a listing entry.
#[derive(Debug, Clone)]
pub struct PostRelations {
    pub author: User,
    pub category: Category,
    pub location: Option<Location>,
}

/// Feed order: newest publish date first, ties broken by comment count.
pub fn feed_order(a: &PostEntry, b: &PostEntry) -> Ordering {
    b.post
        .pub_date
        .cmp(&a.post.pub_date)
        .then_with(|| b.comment_count.unwrap_or(0).cmp(&a.comment_count.unwrap_or(0)))
}
