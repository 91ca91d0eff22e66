//! In-memory database used when `DATABASE_URL` is not configured.
//!
//! Unlike a bare stub, this enforces the same rules the Postgres schema
//! does (username uniqueness, foreign keys, cascading join rows) so the
//! HTTP layer behaves identically against it.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use blog_core::domain::{
    Category, NewPost, NewUser, Post, PostDetail, PostPatch, User, UserPatch,
};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, PostRepository, UserRepository};

#[derive(Default)]
struct MemState {
    users: Vec<User>,
    posts: Vec<Post>,
    categories: Vec<Category>,
    post_categories: Vec<(i32, i32)>,
    next_user_id: i32,
    next_post_id: i32,
    next_category_id: i32,
}

/// Shared in-memory store; repositories hold handles to the same state the
/// way Postgres repositories share one pool.
#[derive(Clone, Default)]
pub struct InMemoryDb {
    state: Arc<Mutex<MemState>>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repository(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            state: self.state.clone(),
        }
    }

    pub fn post_repository(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            state: self.state.clone(),
        }
    }

    /// Insert a category directly. Categories have no HTTP surface; rows
    /// exist only so posts can reference them.
    pub fn seed_category(&self, name: &str) -> Category {
        let mut state = lock(&self.state);
        state.next_category_id += 1;
        let now = Utc::now();
        let category = Category {
            category_id: state.next_category_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.categories.push(category.clone());
        category
    }
}

fn lock(state: &Arc<Mutex<MemState>>) -> MutexGuard<'_, MemState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn detail(state: &MemState, post: &Post) -> PostDetail {
    let author = state
        .users
        .iter()
        .find(|user| user.user_id == post.author_id)
        .cloned();
    let categories = state
        .post_categories
        .iter()
        .filter(|(post_id, _)| *post_id == post.post_id)
        .filter_map(|(_, category_id)| {
            state
                .categories
                .iter()
                .find(|category| category.category_id == *category_id)
                .cloned()
        })
        .collect();

    PostDetail {
        post: post.clone(),
        author,
        categories,
    }
}

fn paginate<T: Clone>(rows: &[T], page: Option<u64>, per_page: u64) -> Vec<T> {
    match page {
        Some(page) => rows
            .iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .cloned()
            .collect(),
        None => rows.to_vec(),
    }
}

pub struct InMemoryUserRepository {
    state: Arc<Mutex<MemState>>,
}

#[async_trait]
impl BaseRepository<User, i32> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        let state = lock(&self.state);
        Ok(state.users.iter().find(|u| u.user_id == id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<u64, RepoError> {
        let mut state = lock(&self.state);

        if state.posts.iter().any(|post| post.author_id == id) {
            return Err(RepoError::Query(
                "update or delete on table \"users\" violates foreign key constraint on \"posts\""
                    .to_string(),
            ));
        }

        let before = state.users.len();
        state.users.retain(|u| u.user_id != id);

        if state.users.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok((before - state.users.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, new: NewUser) -> Result<User, RepoError> {
        let mut state = lock(&self.state);

        if state.users.iter().any(|u| u.username == new.username) {
            return Err(RepoError::Constraint(
                "duplicate key value violates unique constraint \"users_username_key\""
                    .to_string(),
            ));
        }

        state.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            user_id: state.next_user_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_fields(&self, id: i32, patch: UserPatch) -> Result<User, RepoError> {
        let mut state = lock(&self.state);

        if let Some(username) = &patch.username {
            if state
                .users
                .iter()
                .any(|u| u.username == *username && u.user_id != id)
            {
                return Err(RepoError::Constraint(
                    "duplicate key value violates unique constraint \"users_username_key\""
                        .to_string(),
                ));
            }
        }

        let user = state
            .users
            .iter_mut()
            .find(|u| u.user_id == id)
            .ok_or(RepoError::NotFound)?;

        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn list(&self, page: Option<u64>, per_page: u64) -> Result<Vec<User>, RepoError> {
        let state = lock(&self.state);
        Ok(paginate(&state.users, page, per_page))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let state = lock(&self.state);
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let state = lock(&self.state);
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

pub struct InMemoryPostRepository {
    state: Arc<Mutex<MemState>>,
}

impl InMemoryPostRepository {
    fn check_author(state: &MemState, author_id: i32) -> Result<(), RepoError> {
        if !state.users.iter().any(|u| u.user_id == author_id) {
            return Err(RepoError::Query(
                "insert or update on table \"posts\" violates foreign key constraint on \"users\""
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn check_categories(state: &MemState, category_ids: &[i32]) -> Result<(), RepoError> {
        for id in category_ids {
            if !state.categories.iter().any(|c| c.category_id == *id) {
                return Err(RepoError::Query(format!(
                    "insert or update on table \"post_categories\" violates foreign key \
                     constraint: category {id} does not exist"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        let state = lock(&self.state);
        Ok(state.posts.iter().find(|p| p.post_id == id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<u64, RepoError> {
        let mut state = lock(&self.state);

        let before = state.posts.len();
        state.posts.retain(|p| p.post_id != id);

        if state.posts.len() == before {
            return Err(RepoError::NotFound);
        }

        // Join rows cascade with the post.
        state.post_categories.retain(|(post_id, _)| *post_id != id);
        Ok((before - state.posts.len()) as u64)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, new: NewPost) -> Result<PostDetail, RepoError> {
        let mut state = lock(&self.state);

        Self::check_author(&state, new.author_id)?;
        Self::check_categories(&state, &new.category_ids)?;

        state.next_post_id += 1;
        let now = Utc::now();
        let post = Post {
            post_id: state.next_post_id,
            title: new.title,
            content: new.content,
            author_id: new.author_id,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        for category_id in new.category_ids {
            state.post_categories.push((post.post_id, category_id));
        }

        Ok(detail(&state, &post))
    }

    async fn update_fields(&self, id: i32, patch: PostPatch) -> Result<PostDetail, RepoError> {
        let mut state = lock(&self.state);

        if !state.posts.iter().any(|p| p.post_id == id) {
            return Err(RepoError::NotFound);
        }
        if let Some(author_id) = patch.author_id {
            Self::check_author(&state, author_id)?;
        }
        if let Some(category_ids) = &patch.category_ids {
            Self::check_categories(&state, category_ids)?;
        }

        let post = {
            let post = state
                .posts
                .iter_mut()
                .find(|p| p.post_id == id)
                .ok_or(RepoError::NotFound)?;

            if let Some(title) = patch.title {
                post.title = title;
            }
            if let Some(content) = patch.content {
                post.content = content;
            }
            if let Some(author_id) = patch.author_id {
                post.author_id = author_id;
            }
            post.updated_at = Utc::now();
            post.clone()
        };

        if let Some(category_ids) = patch.category_ids {
            state.post_categories.retain(|(post_id, _)| *post_id != id);
            for category_id in category_ids {
                state.post_categories.push((id, category_id));
            }
        }

        Ok(detail(&state, &post))
    }

    async fn find_detail(&self, id: i32) -> Result<Option<PostDetail>, RepoError> {
        let state = lock(&self.state);
        Ok(state
            .posts
            .iter()
            .find(|p| p.post_id == id)
            .map(|post| detail(&state, post)))
    }

    async fn list(&self, page: Option<u64>, per_page: u64) -> Result<Vec<PostDetail>, RepoError> {
        let state = lock(&self.state);
        let posts = paginate(&state.posts, page, per_page);
        Ok(posts.iter().map(|post| detail(&state, post)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2$fake".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let db = InMemoryDb::new();
        let users = db.user_repository();

        let first = users.insert(new_user("alice")).await.unwrap();
        let second = users.insert(new_user("bob")).await.unwrap();

        assert_eq!(first.user_id, 1);
        assert_eq!(second.user_id, 2);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_constraint_violation() {
        let db = InMemoryDb::new();
        let users = db.user_repository();

        users.insert(new_user("alice")).await.unwrap();
        let err = users.insert(new_user("alice")).await.unwrap_err();

        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn list_paginates_in_insertion_order() {
        let db = InMemoryDb::new();
        let users = db.user_repository();

        for name in ["a", "b", "c", "d", "e"] {
            users.insert(new_user(name)).await.unwrap();
        }

        let page = users.list(Some(2), 2).await.unwrap();
        let ids: Vec<i32> = page.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![3, 4]);

        // No page: the unpaginated first result set.
        let all = users.list(None, 2).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn update_fields_applies_only_masked_fields() {
        let db = InMemoryDb::new();
        let users = db.user_repository();

        let created = users.insert(new_user("alice")).await.unwrap();
        let patch = UserPatch {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        let updated = users.update_fields(created.user_id, patch).await.unwrap();

        assert_eq!(updated.username, "alice");
        assert_eq!(updated.email, "new@example.com");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn delete_twice_yields_not_found() {
        let db = InMemoryDb::new();
        let users = db.user_repository();

        let created = users.insert(new_user("alice")).await.unwrap();
        assert_eq!(users.delete(created.user_id).await.unwrap(), 1);
        assert!(matches!(
            users.delete(created.user_id).await.unwrap_err(),
            RepoError::NotFound
        ));
    }

    #[tokio::test]
    async fn post_insert_enforces_foreign_keys() {
        let db = InMemoryDb::new();
        let users = db.user_repository();
        let posts = db.post_repository();

        let author = users.insert(new_user("alice")).await.unwrap();

        // Unknown author.
        let err = posts
            .insert(NewPost {
                title: "t".to_string(),
                content: "c".to_string(),
                author_id: 999,
                category_ids: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Query(_)));

        // Unknown category.
        let err = posts
            .insert(NewPost {
                title: "t".to_string(),
                content: "c".to_string(),
                author_id: author.user_id,
                category_ids: vec![42],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Query(_)));
    }

    #[tokio::test]
    async fn post_update_replaces_category_links() {
        let db = InMemoryDb::new();
        let users = db.user_repository();
        let posts = db.post_repository();

        let author = users.insert(new_user("alice")).await.unwrap();
        let news = db.seed_category("news");
        let tech = db.seed_category("tech");

        let created = posts
            .insert(NewPost {
                title: "t".to_string(),
                content: "c".to_string(),
                author_id: author.user_id,
                category_ids: vec![news.category_id],
            })
            .await
            .unwrap();

        let patch = PostPatch {
            category_ids: Some(vec![tech.category_id]),
            ..Default::default()
        };
        let updated = posts
            .update_fields(created.post.post_id, patch)
            .await
            .unwrap();

        let names: Vec<&str> = updated.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["tech"]);
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_links() {
        let db = InMemoryDb::new();
        let users = db.user_repository();
        let posts = db.post_repository();

        let author = users.insert(new_user("alice")).await.unwrap();
        let news = db.seed_category("news");
        let created = posts
            .insert(NewPost {
                title: "t".to_string(),
                content: "c".to_string(),
                author_id: author.user_id,
                category_ids: vec![news.category_id],
            })
            .await
            .unwrap();

        posts.delete(created.post.post_id).await.unwrap();
        assert_eq!(lock(&db.state).post_categories.len(), 0);
    }

    #[tokio::test]
    async fn deleting_an_authoring_user_is_rejected() {
        let db = InMemoryDb::new();
        let users = db.user_repository();
        let posts = db.post_repository();

        let author = users.insert(new_user("alice")).await.unwrap();
        let news = db.seed_category("news");
        posts
            .insert(NewPost {
                title: "t".to_string(),
                content: "c".to_string(),
                author_id: author.user_id,
                category_ids: vec![news.category_id],
            })
            .await
            .unwrap();

        assert!(matches!(
            users.delete(author.user_id).await.unwrap_err(),
            RepoError::Query(_)
        ));
    }
}
