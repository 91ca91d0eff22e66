//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`:
//! SeaORM-backed repositories, schema synchronization, the Argon2 password
//! service, and an in-memory database used when no `DATABASE_URL` is set.

pub mod auth;
pub mod database;

pub use auth::Argon2PasswordService;
pub use database::{
    DatabaseConfig, InMemoryDb, PostgresPostRepository, PostgresUserRepository,
};
