//! # pb-api
//!
//! The web routing and orchestration layer for Parkboard.

pub mod handlers;
pub mod middleware;
pub mod sanitize;
pub mod validate;

use actix_web::web;

/// Configures the routes for the application.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the surface under different paths if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/", web::get().to(handlers::index))
            .route("/login", web::get().to(handlers::login_page))
            .route("/login", web::post().to(handlers::login))
            .route("/register", web::post().to(handlers::register))
            .route("/logout", web::get().to(handlers::logout))
            .route("/create-account", web::get().to(handlers::create_account_page))
            .route("/homepage", web::get().to(handlers::homepage))
            .route("/park", web::get().to(handlers::park_page))
            .route("/park", web::post().to(handlers::park_post))
            .route("/create-post", web::get().to(handlers::create_post_page))
            .route("/create-post", web::post().to(handlers::create_post))
            .route("/reserve", web::post().to(handlers::reserve))
            .route("/navigate-to-home", web::post().to(handlers::navigate_home))
            .route("/navigate-to-reserve", web::post().to(handlers::navigate_reserve))
            .route("/view-history", web::post().to(handlers::view_history)),
    );
}
