//! # Gazette Infrastructure
//!
//! Concrete implementations of the ports defined in `gazette-core`:
//! PostgreSQL repositories via SeaORM, an in-memory repository set used as
//! DB-less fallback and test double, and the JWT/Argon2 auth services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory repositories only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use memory::{
    MemoryCategoryRepository, MemoryCommentRepository, MemoryLocationRepository,
    MemoryPostRepository, MemoryStore, MemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresLocationRepository, PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
