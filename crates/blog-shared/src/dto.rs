//! Data Transfer Objects - request/response types for the API.
//!
//! Request fields are optional so that validation can enumerate every
//! missing field in one pass instead of failing at deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blog_core::domain::{PostDetail, User};

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request to partially update a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request to log in by username or email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: Option<String>,
    pub password: Option<String>,
}

/// Stateless login acknowledgment - no token or session is issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub login: bool,
    pub message: String,
}

/// Request to create a new post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<i32>,
    pub categories: Option<Vec<i32>>,
}

/// Request to partially update a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<i32>,
    pub categories: Option<Vec<i32>>,
}

/// A user's public representation. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Author projection used in post listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub user_id: i32,
    pub username: String,
}

/// Author projection used in the single-post view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorDetail {
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

/// Category projection nested under posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub category_id: i32,
    pub name: String,
}

/// Listing row for posts: no content, author and categories reduced to
/// id + display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub post_id: i32,
    pub title: String,
    pub author: Option<AuthorRef>,
    pub categories: Vec<CategoryRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostDetail> for PostSummary {
    fn from(detail: PostDetail) -> Self {
        Self {
            post_id: detail.post.post_id,
            title: detail.post.title,
            author: detail.author.map(|author| AuthorRef {
                user_id: author.user_id,
                username: author.username,
            }),
            categories: detail
                .categories
                .into_iter()
                .map(|category| CategoryRef {
                    category_id: category.category_id,
                    name: category.name,
                })
                .collect(),
            created_at: detail.post.created_at,
            updated_at: detail.post.updated_at,
        }
    }
}

/// Full post representation with nested author and categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub post_id: i32,
    pub title: String,
    pub content: String,
    pub author: Option<AuthorDetail>,
    pub categories: Vec<CategoryRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostDetail> for PostResponse {
    fn from(detail: PostDetail) -> Self {
        Self {
            post_id: detail.post.post_id,
            title: detail.post.title,
            content: detail.post.content,
            author: detail.author.map(|author| AuthorDetail {
                user_id: author.user_id,
                username: author.username,
                email: author.email,
            }),
            categories: detail
                .categories
                .into_iter()
                .map(|category| CategoryRef {
                    category_id: category.category_id,
                    name: category.name,
                })
                .collect(),
            created_at: detail.post.created_at,
            updated_at: detail.post.updated_at,
        }
    }
}

/// Result of a delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub affected: u64,
}
