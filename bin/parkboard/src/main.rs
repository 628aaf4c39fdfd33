//! # Parkboard Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use pb_api::handlers::AppState;
use pb_api::middleware::SessionDecoder;

#[cfg(feature = "db-sqlite")]
use pb_db_sqlite::SqliteStore;

#[cfg(feature = "auth-jwt")]
use pb_auth_jwt::JwtAuthProvider;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Read-once configuration: both the secret and the pool are built here
    // and handed to components explicitly.
    let secret = std::env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:parkboard.db?mode=rwc".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000);

    #[cfg(feature = "db-sqlite")]
    let store = SqliteStore::connect(&database_url)
        .await
        .context("failed to open the database")?;

    #[cfg(feature = "auth-jwt")]
    let auth = JwtAuthProvider::new(secret);

    let state = web::Data::new(AppState {
        users: Box::new(store.clone()),
        domain: Box::new(store),
        auth: Box::new(auth),
    });

    log::info!("parkboard listening on http://127.0.0.1:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            // Registered last so it runs first: every request enters the
            // handlers with an explicit authentication state attached.
            .wrap(SessionDecoder)
            .service(actix_files::Files::new("/static", "./public"))
            .configure(pb_api::configure_routes)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await?;

    Ok(())
}
