//! soundclash-server library - bracket engine and HTTP API
//!
//! Runs single-elimination, timed, audience-voted music bracket
//! tournaments. Round expiry is detected lazily on every bracket read;
//! there is no background scheduler.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use crate::api::auth::AdminAuth;
use crate::catalog::TrackCatalog;

pub mod api;
pub mod bracket;
pub mod catalog;
pub mod db;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// External track catalog (Spotify, or disabled when unconfigured)
    pub catalog: Arc<dyn TrackCatalog>,
    /// Admin password check and bearer token signing
    pub auth: AdminAuth,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, catalog: Arc<dyn TrackCatalog>, auth: AdminAuth) -> Self {
        Self { db, catalog, auth }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    // Admin lifecycle commands (require a bearer token)
    let admin = Router::new()
        .route("/api/admin/tournaments", post(api::admin::create_tournament))
        .route(
            "/api/admin/tournaments/:id/songs",
            post(api::admin::add_song).delete(api::admin::remove_song),
        )
        .route(
            "/api/admin/tournaments/:id/start",
            post(api::admin::start_tournament),
        )
        .route("/api/admin/tournaments/:id", delete(api::admin::delete_tournament))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::require_admin,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/admin/login", post(api::admin::login))
        .route("/api/tournaments", get(api::voting::list_tournaments))
        .route("/api/tournaments/:id", get(api::voting::get_bracket))
        .route(
            "/api/tournaments/:id/matches/:match_id/vote/:option",
            post(api::voting::cast_vote),
        )
        .merge(api::health::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
