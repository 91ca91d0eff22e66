use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity - a label attachable to many posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
