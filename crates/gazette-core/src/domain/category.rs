use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity - a publishing section posts belong to.
///
/// Unpublishing a category hides every post in it from the public feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(title: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}
