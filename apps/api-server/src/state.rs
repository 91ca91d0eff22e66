//! Application state - shared across all handlers.
//!
//! Repositories and the password service are constructed once at startup
//! and injected as trait objects; no handler touches a global connection.

use std::sync::Arc;

use blog_core::ports::{PasswordService, PostRepository, UserRepository};
use blog_infra::database::{connect, sync_schema};
use blog_infra::{
    Argon2PasswordService, DatabaseConfig, InMemoryDb, PostgresPostRepository,
    PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        let state = match db_config {
            Some(config) => match connect(config).await {
                Ok(db) => {
                    if let Err(e) = sync_schema(&db).await {
                        tracing::error!("Schema synchronization failed: {}", e);
                    }
                    Self {
                        users: Arc::new(PostgresUserRepository::new(db.clone())),
                        posts: Arc::new(PostgresPostRepository::new(db)),
                        passwords: Arc::new(Argon2PasswordService::new()),
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory().0
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory().0
            }
        };

        tracing::info!("Application state initialized");
        state
    }

    /// State backed by the in-memory database. Also returns the database
    /// handle so callers (tests, mainly) can seed rows directly.
    pub fn in_memory() -> (Self, InMemoryDb) {
        let db = InMemoryDb::new();
        let state = Self {
            users: Arc::new(db.user_repository()),
            posts: Arc::new(db.post_repository()),
            passwords: Arc::new(Argon2PasswordService::new()),
        };
        (state, db)
    }
}
