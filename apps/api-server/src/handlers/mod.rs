//! HTTP handlers and route configuration.

mod health;
mod posts;
mod users;

use actix_web::web;
use serde::Deserialize;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::health_check)).service(
        web::scope("/api/v1")
            .service(
                web::scope("/users")
                    .route("/", web::post().to(users::create))
                    .route("/", web::get().to(users::get_all))
                    .route("/login", web::post().to(users::login))
                    .route("/{id}", web::get().to(users::get_one))
                    .route("/{id}", web::put().to(users::update))
                    .route("/{id}", web::delete().to(users::delete)),
            )
            .service(
                web::scope("/posts")
                    .route("/", web::post().to(posts::create))
                    .route("/", web::get().to(posts::get_all))
                    .route("/{id}", web::get().to(posts::get_one))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete)),
            ),
    );
}

/// Pagination query: `?page=n`.
#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    pub page: Option<String>,
}

/// Path ids are positive integers; anything else is treated as an unknown
/// resource (404) rather than a malformed request.
pub(crate) fn parse_id(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok().filter(|id| *id > 0)
}

/// Pages are 1-based; a missing or unparseable value disables pagination.
pub(crate) fn parse_page(raw: Option<&str>) -> Option<u64> {
    raw?.parse::<u64>().ok().filter(|page| *page > 0)
}
