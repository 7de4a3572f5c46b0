pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod password;
pub mod query;
pub mod routes;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use auth::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt: JwtKeys,
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
/// `jwt_secret` signs and verifies the bearer tokens issued by the auth routes.
pub fn build_app(pool: SqlitePool, jwt_secret: &str) -> Router {
    let state = AppState {
        db: pool,
        jwt: JwtKeys::new(jwt_secret),
    };

    Router::new()
        .route("/health", get(health))
        .merge(routes::auth::router())
        .merge(routes::links::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
