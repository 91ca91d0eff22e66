use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::user::User;

/// Post entity - a publication row referencing its author by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub post_id: i32,
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post together with its loaded relations.
///
/// `author` is `None` only when the referenced row has disappeared between
/// queries; callers treat that as an absent author rather than an error.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub author: Option<User>,
    pub categories: Vec<Category>,
}

/// Fields required to insert a new post. Referenced author and category ids
/// are not verified here; the database foreign keys are authoritative.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub category_ids: Vec<i32>,
}

/// Field mask for a partial post update; a supplied `category_ids` list
/// replaces the post's category links wholesale.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<i32>,
    pub category_ids: Option<Vec<i32>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.author_id.is_none()
            && self.category_ids.is_none()
    }
}
