//! User CRUD and login handlers.

use actix_web::{HttpResponse, web};

use blog_core::domain::{NewUser, UserPatch};
use blog_core::error::RepoError;
use blog_shared::dto::{
    CreateUserRequest, DeleteResponse, LoginRequest, LoginResponse, UpdateUserRequest,
    UserResponse,
};

use crate::handlers::{PageQuery, parse_id, parse_page};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Fixed page size for user listings.
const PAGE_SIZE: u64 = 15;

/// POST /api/v1/users/
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.unwrap_or_default();
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push("Username is required".to_string());
    }
    if email.is_empty() {
        errors.push("Email is required".to_string());
    }
    if password.is_empty() {
        errors.push("Password is required".to_string());
    } else if password.chars().count() < 6 {
        errors.push("Password must be at least 6 characters".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let password_hash = state
        .passwords
        .hash(&password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Uniqueness is the database's job; a unique violation comes back as a
    // constraint error and is reported as a validation failure.
    match state
        .users
        .insert(NewUser {
            username: username.clone(),
            email,
            password_hash,
        })
        .await
    {
        Ok(user) => Ok(HttpResponse::Created().json(UserResponse::from(user))),
        Err(RepoError::Constraint(_)) => Err(AppError::Validation(vec![format!(
            "Username '{username}' is already taken"
        )])),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/users/?page=n
pub async fn get_all(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = parse_page(query.page.as_deref());
    let users = state.users.list(page, PAGE_SIZE).await?;

    let users: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/v1/users/{id}
pub async fn get_one(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let Some(id) = parse_id(&path) else {
        return Err(AppError::NotFound("Invalid user id".to_string()));
    };

    match state.users.find_by_id(id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(UserResponse::from(user))),
        None => Err(AppError::NotFound(format!("User with id = {id} not found"))),
    }
}

/// PUT /api/v1/users/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let Some(id) = parse_id(&path) else {
        return Err(AppError::NotFound("Invalid user id".to_string()));
    };

    let req = body.into_inner();
    let mut patch = UserPatch {
        username: req.username.filter(|s| !s.is_empty()),
        email: req.email.filter(|s| !s.is_empty()),
        password_hash: None,
    };
    if let Some(password) = req.password.filter(|s| !s.is_empty()) {
        patch.password_hash = Some(
            state
                .passwords
                .hash(&password)
                .map_err(|e| AppError::Internal(e.to_string()))?,
        );
    }

    let requested_username = patch.username.clone();

    match state.users.update_fields(id, patch).await {
        Ok(user) => Ok(HttpResponse::Ok().json(UserResponse::from(user))),
        Err(RepoError::NotFound) => Err(AppError::NotFound(format!(
            "User with id = {id} not found"
        ))),
        Err(RepoError::Constraint(_)) => Err(AppError::Validation(vec![format!(
            "Username '{}' is already taken",
            requested_username.unwrap_or_default()
        )])),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/v1/users/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let Some(id) = parse_id(&path) else {
        return Err(AppError::NotFound("Invalid user id".to_string()));
    };

    match state.users.delete(id).await {
        Ok(affected) => Ok(HttpResponse::Ok().json(DeleteResponse { affected })),
        Err(RepoError::NotFound) => Err(AppError::NotFound(format!(
            "User with id = {id} not found"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/v1/users/login
///
/// Stateless acknowledgment only; no token or session is issued.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let identifier = req.username_or_email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    // An '@' selects the lookup field.
    let account = if identifier.contains('@') {
        state.users.find_by_email(&identifier).await?
    } else {
        state.users.find_by_username(&identifier).await?
    };

    let Some(account) = account else {
        return Err(AppError::LoginFailed);
    };

    let valid = state
        .passwords
        .verify(&password, &account.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::LoginFailed);
    }

    Ok(HttpResponse::Ok().json(LoginResponse {
        login: true,
        message: format!("Welcome back, {}!", account.username),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn create_body(username: &str) -> Value {
        json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "hunter22",
        })
    }

    #[actix_web::test]
    async fn create_returns_user_without_password() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(create_body("alice"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["user_id"], 1);
        assert_eq!(body["username"], "alice");
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn create_collects_all_validation_errors() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(json!({"username": "alice"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn create_rejects_short_password() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "12345",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_str().unwrap().contains("6 characters"));
    }

    #[actix_web::test]
    async fn duplicate_username_names_the_conflict() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(create_body("alice"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(create_body("alice"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"][0].as_str().unwrap().contains("alice"));
    }

    #[actix_web::test]
    async fn create_then_fetch_round_trips() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(create_body("alice"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/users/1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["username"], "alice");
        assert_eq!(body["email"], "alice@example.com");
    }

    #[actix_web::test]
    async fn get_one_rejects_bad_ids_as_not_found() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        for uri in ["/api/v1/users/abc", "/api/v1/users/0", "/api/v1/users/99"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);

            let body: Value = test::read_body_json(resp).await;
            assert!(body["errors"].is_array());
        }
    }

    #[actix_web::test]
    async fn update_applies_only_supplied_fields() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(create_body("alice"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/v1/users/1")
            .set_json(json!({"email": "new@example.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["username"], "alice");
        assert_eq!(body["email"], "new@example.com");
    }

    #[actix_web::test]
    async fn delete_is_idempotent_in_effect() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(create_body("alice"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::delete()
            .uri("/api/v1/users/1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["affected"], 1);

        let req = test::TestRequest::delete()
            .uri("/api/v1/users/1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn login_accepts_username_or_email() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(create_body("alice"))
            .to_request();
        test::call_service(&app, req).await;

        for identifier in ["alice", "alice@example.com"] {
            let req = test::TestRequest::post()
                .uri("/api/v1/users/login")
                .set_json(json!({
                    "username_or_email": identifier,
                    "password": "hunter22",
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["login"], true);
        }
    }

    #[actix_web::test]
    async fn login_failures_are_forbidden() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/users/")
            .set_json(create_body("alice"))
            .to_request();
        test::call_service(&app, req).await;

        // Wrong password, then unknown identifier.
        for (identifier, password) in [("alice", "wrong-password"), ("nobody", "hunter22")] {
            let req = test::TestRequest::post()
                .uri("/api/v1/users/login")
                .set_json(json!({
                    "username_or_email": identifier,
                    "password": password,
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["login"], false);
        }
    }

    #[actix_web::test]
    async fn get_all_projects_out_the_password() {
        let (state, _db) = AppState::in_memory();
        let app = init_app!(state);

        for username in ["alice", "bob"] {
            let req = test::TestRequest::post()
                .uri("/api/v1/users/")
                .set_json(create_body(username))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get().uri("/api/v1/users/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].get("password_hash").is_none());

        // Page 2 with page size 15 is past the data: empty, not an error.
        let req = test::TestRequest::get()
            .uri("/api/v1/users/?page=2")
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }
}
