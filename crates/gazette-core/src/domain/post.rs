use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a single blog entry.
///
/// `pub_date` may lie in the future; such posts stay hidden from the
/// public feed until the date passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `author_id`, published by default.
    pub fn new(
        author_id: Uuid,
        category_id: Uuid,
        location_id: Option<Uuid>,
        title: String,
        text: String,
        pub_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id,
            location_id,
            title,
            text,
            pub_date,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}
