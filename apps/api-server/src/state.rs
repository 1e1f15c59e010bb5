//! Application state - shared across all handlers.

use std::sync::Arc;

use gazette_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use gazette_infra::memory::{
    MemoryCategoryRepository, MemoryCommentRepository, MemoryLocationRepository,
    MemoryPostRepository, MemoryStore, MemoryUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub page_size: u64,
}

impl AppState {
    /// Build the application state with the appropriate repository backend.
    pub async fn new(config: &AppConfig) -> Self {
        if let Some(db_config) = &config.database {
            use gazette_infra::database::{
                PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
                PostgresPostRepository, PostgresUserRepository, connect,
            };

            match connect(db_config).await {
                Ok(conn) => {
                    tracing::info!("Application state initialized (postgres)");
                    return Self {
                        posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                        categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
                        locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
                        comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
                        users: Arc::new(PostgresUserRepository::new(conn)),
                        page_size: config.page_size,
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self::in_memory(config.page_size)
    }

    /// State backed entirely by the in-memory repositories.
    pub fn in_memory(page_size: u64) -> Self {
        let store = MemoryStore::new();
        Self {
            posts: Arc::new(MemoryPostRepository(store.clone())),
            categories: Arc::new(MemoryCategoryRepository(store.clone())),
            locations: Arc::new(MemoryLocationRepository(store.clone())),
            comments: Arc::new(MemoryCommentRepository(store.clone())),
            users: Arc::new(MemoryUserRepository(store)),
            page_size,
        }
    }
}
