#[cfg(test)]
mod tests {
    use crate::database::entity::{post, user};
    use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
    use blog_core::domain::{NewUser, Post, User};
    use blog_core::error::RepoError;
    use blog_core::ports::{BaseRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn user_model(user_id: i32, username: &str) -> user::Model {
        let now = chrono::Utc::now();
        user::Model {
            user_id,
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2$fake".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                post_id: 7,
                title: "Test Post".to_owned(),
                content: "Content".to_owned(),
                author_id: 1,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(7).await.unwrap();

        assert!(result.is_some());
        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.post_id, 7);
    }

    #[tokio::test]
    async fn test_insert_user_returns_generated_id() {
        // Postgres inserts run as a RETURNING query against the mock.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model(42, "alice")]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let user: User = repo
            .insert(NewUser {
                username: "alice".to_owned(),
                email: "alice@example.com".to_owned(),
                password_hash: "$argon2$fake".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(user.user_id, 42);
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_find_user_by_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model(1, "bob")]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let result = repo.find_by_username("bob").await.unwrap();
        assert_eq!(result.unwrap().email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let result: Result<u64, _> = BaseRepository::<User, i32>::delete(&repo, 5).await;
        assert!(matches!(result.unwrap_err(), RepoError::NotFound));
    }
}
