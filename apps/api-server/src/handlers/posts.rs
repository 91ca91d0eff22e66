//! Post CRUD handlers.

use actix_web::{HttpResponse, web};

use blog_core::domain::{NewPost, PostPatch};
use blog_core::error::RepoError;
use blog_shared::dto::{
    CreatePostRequest, DeleteResponse, PostResponse, PostSummary, UpdatePostRequest,
};

use crate::handlers::{PageQuery, parse_id, parse_page};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Fixed page size for post listings.
const PAGE_SIZE: u64 = 10;

/// POST /api/v1/posts/
///
/// Referenced author and category ids are not pre-checked; the database
/// foreign keys are authoritative and a violation surfaces as a 500.
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let title = req.title.unwrap_or_default();
    let content = req.content.unwrap_or_default();
    let author_id = req.author_id.filter(|id| *id > 0);
    let category_ids = req.categories.unwrap_or_default();

    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push("Title is required".to_string());
    }
    if content.is_empty() {
        errors.push("Content is required".to_string());
    }
    if author_id.is_none() {
        errors.push("Post must have an author".to_string());
    }
    if category_ids.is_empty() {
        errors.push("Post must have at least one category".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let detail = state
        .posts
        .insert(NewPost {
            title,
            content,
            // Checked above.
            author_id: author_id.unwrap_or_default(),
            category_ids,
        })
        .await?;

    Ok(HttpResponse::Created().json(PostResponse::from(detail)))
}

/// GET /api/v1/posts/?page=n
pub async fn get_all(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = parse_page(query.page.as_deref());
    let posts = state.posts.list(page, PAGE_SIZE).await?;

    let posts: Vec<PostSummary> = posts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/v1/posts/{id}
pub async fn get_one(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let Some(id) = parse_id(&path) else {
        return Err(AppError::NotFound("Invalid post id".to_string()));
    };

    match state.posts.find_detail(id).await? {
        Some(detail) => Ok(HttpResponse::Ok().json(PostResponse::from(detail))),
        None => Err(AppError::NotFound(format!("Post with id = {id} not found"))),
    }
}

/// PUT /api/v1/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let Some(id) = parse_id(&path) else {
        return Err(AppError::NotFound("Invalid post id".to_string()));
    };

    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title.filter(|s| !s.is_empty()),
        content: req.content.filter(|s| !s.is_empty()),
        author_id: req.author_id.filter(|id| *id > 0),
        category_ids: req.categories.filter(|ids| !ids.is_empty()),
    };

    match state.posts.update_fields(id, patch).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(PostResponse::from(detail))),
        Err(RepoError::NotFound) => Err(AppError::NotFound(format!(
            "Post with id = {id} not found"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/v1/posts/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let Some(id) = parse_id(&path) else {
        return Err(AppError::NotFound("Invalid post id".to_string()));
    };

    match state.posts.delete(id).await {
        Ok(affected) => Ok(HttpResponse::Ok().json(DeleteResponse { affected })),
        Err(RepoError::NotFound) => Err(AppError::NotFound(format!(
            "Post with id = {id} not found"
        ))),
        Err(e) => Err(e.into()),
    }
}
