//! PostgreSQL persistence via SeaORM.

mod connections;
pub mod entity;
mod repos;
mod seaorm_base;

pub use connections::{DatabaseConfig, connect};
pub use repos::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};
pub use seaorm_base::SeaOrmRepository;

#[cfg(test)]
mod tests;
