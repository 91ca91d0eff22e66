//! Database access: connection management, schema synchronization, and the
//! Postgres and in-memory repository implementations.

mod connections;
mod memory;
mod postgres_base;
mod postgres_repo;
mod schema;

pub mod entity;

pub use connections::{DatabaseConfig, connect};
pub use memory::InMemoryDb;
pub use postgres_repo::{PostgresPostRepository, PostgresUserRepository};
pub use schema::sync_schema;

#[cfg(test)]
mod tests;
