use async_trait::async_trait;

use crate::domain::{NewPost, NewUser, Post, PostDetail, PostPatch, User, UserPatch};
use crate::error::RepoError;

/// Generic repository trait for operations every entity supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID, returning the number of rows removed.
    /// Fails with [`RepoError::NotFound`] when nothing matched.
    async fn delete(&self, id: ID) -> Result<u64, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    /// Insert a new user. Username uniqueness is enforced by the store and
    /// surfaces as [`RepoError::Constraint`].
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;

    /// Apply a field mask to an existing user, bumping `updated_at`.
    /// Fails with [`RepoError::NotFound`] when the id matches no row.
    async fn update_fields(&self, id: i32, patch: UserPatch) -> Result<User, RepoError>;

    /// List users in insertion order. `page` is 1-based; `None` returns the
    /// unpaginated first result set.
    async fn list(&self, page: Option<u64>, per_page: u64) -> Result<Vec<User>, RepoError>;

    /// Find a user by their unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Insert a new post and link its categories.
    async fn insert(&self, post: NewPost) -> Result<PostDetail, RepoError>;

    /// Apply a field mask to an existing post, replacing category links when
    /// the mask carries them.
    async fn update_fields(&self, id: i32, patch: PostPatch) -> Result<PostDetail, RepoError>;

    /// Find a post with its author and categories loaded.
    async fn find_detail(&self, id: i32) -> Result<Option<PostDetail>, RepoError>;

    /// List posts in insertion order with relations loaded.
    async fn list(&self, page: Option<u64>, per_page: u64) -> Result<Vec<PostDetail>, RepoError>;
}
