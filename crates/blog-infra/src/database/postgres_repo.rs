//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, LoaderTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use blog_core::domain::{NewPost, NewUser, PostDetail, PostPatch, User, UserPatch};
use blog_core::error::RepoError;
use blog_core::ports::{PostRepository, UserRepository};

use super::entity::category::Entity as CategoryEntity;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Classify a write failure: unique violations become `Constraint`, anything
/// else is an opaque query error.
fn map_save_err(e: DbErr) -> RepoError {
    let msg = e.to_string();
    if msg.contains("duplicate") || msg.contains("unique") {
        RepoError::Constraint(msg)
    } else {
        RepoError::Query(msg)
    }
}

fn map_query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, new: NewUser) -> Result<User, RepoError> {
        let now = Utc::now();
        let model = user::ActiveModel {
            user_id: NotSet,
            username: Set(new.username),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let saved = model.insert(&self.db).await.map_err(map_save_err)?;
        Ok(saved.into())
    }

    async fn update_fields(&self, id: i32, patch: UserPatch) -> Result<User, RepoError> {
        let mut model = user::ActiveModel {
            user_id: Set(id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        if let Some(username) = patch.username {
            model.username = Set(username);
        }
        if let Some(email) = patch.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = patch.password_hash {
            model.password_hash = Set(password_hash);
        }

        let updated = model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => RepoError::NotFound,
            e => map_save_err(e),
        })?;

        Ok(updated.into())
    }

    async fn list(&self, page: Option<u64>, per_page: u64) -> Result<Vec<User>, RepoError> {
        let mut query = UserEntity::find().order_by_asc(user::Column::UserId);

        if let Some(page) = page {
            query = query.offset((page - 1) * per_page).limit(per_page);
        }

        let users = query.all(&self.db).await.map_err(map_query_err)?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_query_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, new: NewPost) -> Result<PostDetail, RepoError> {
        let now = Utc::now();
        let model = post::ActiveModel {
            post_id: NotSet,
            title: Set(new.title),
            content: Set(new.content),
            author_id: Set(new.author_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let saved = model.insert(&self.db).await.map_err(map_save_err)?;
        self.link_categories(saved.post_id, &new.category_ids)
            .await?;

        self.load_detail(saved).await
    }

    async fn update_fields(&self, id: i32, patch: PostPatch) -> Result<PostDetail, RepoError> {
        let mut model = post::ActiveModel {
            post_id: Set(id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        if let Some(title) = patch.title {
            model.title = Set(title);
        }
        if let Some(content) = patch.content {
            model.content = Set(content);
        }
        if let Some(author_id) = patch.author_id {
            model.author_id = Set(author_id);
        }

        let updated = model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => RepoError::NotFound,
            e => map_save_err(e),
        })?;

        // A supplied category list replaces the existing links wholesale.
        if let Some(category_ids) = patch.category_ids {
            PostCategoryEntity::delete_many()
                .filter(post_category::Column::PostId.eq(id))
                .exec(&self.db)
                .await
                .map_err(map_query_err)?;

            self.link_categories(id, &category_ids).await?;
        }

        self.load_detail(updated).await
    }

    async fn find_detail(&self, id: i32) -> Result<Option<PostDetail>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_query_err)?
        else {
            return Ok(None);
        };

        self.load_detail(model).await.map(Some)
    }

    async fn list(&self, page: Option<u64>, per_page: u64) -> Result<Vec<PostDetail>, RepoError> {
        let mut query = PostEntity::find().order_by_asc(post::Column::PostId);

        if let Some(page) = page {
            query = query.offset((page - 1) * per_page).limit(per_page);
        }

        let posts = query.all(&self.db).await.map_err(map_query_err)?;

        let authors = posts
            .load_one(UserEntity, &self.db)
            .await
            .map_err(map_query_err)?;
        let categories = posts
            .load_many_to_many(CategoryEntity, PostCategoryEntity, &self.db)
            .await
            .map_err(map_query_err)?;

        let details = posts
            .into_iter()
            .zip(authors)
            .zip(categories)
            .map(|((post, author), categories)| PostDetail {
                post: post.into(),
                author: author.map(Into::into),
                categories: categories.into_iter().map(Into::into).collect(),
            })
            .collect();

        Ok(details)
    }
}

impl PostgresPostRepository {
    async fn link_categories(&self, post_id: i32, category_ids: &[i32]) -> Result<(), RepoError> {
        if category_ids.is_empty() {
            return Ok(());
        }

        let rows = category_ids
            .iter()
            .map(|&category_id| post_category::ActiveModel {
                post_id: Set(post_id),
                category_id: Set(category_id),
            });

        PostCategoryEntity::insert_many(rows)
            .exec(&self.db)
            .await
            .map_err(map_save_err)?;

        Ok(())
    }

    async fn load_detail(&self, model: post::Model) -> Result<PostDetail, RepoError> {
        let author = model
            .find_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(map_query_err)?;
        let categories = model
            .find_related(CategoryEntity)
            .all(&self.db)
            .await
            .map_err(map_query_err)?;

        Ok(PostDetail {
            post: model.into(),
            author: author.map(Into::into),
            categories: categories.into_iter().map(Into::into).collect(),
        })
    }
}
