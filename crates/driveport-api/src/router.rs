//! Route definitions for the DrivePort HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(item_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Auth endpoints: register, login, refresh, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/me", get(handlers::auth::me))
}

/// Member management and self-service endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/members", get(handlers::user::list_members))
        .route("/users/members", post(handlers::user::create_member))
        .route(
            "/users/members/{id}/role",
            put(handlers::user::assign_role),
        )
        .route("/users/me", put(handlers::user::update_profile))
        .route("/users/me/password", put(handlers::user::change_password))
}

/// Drive item endpoints: listing, upload, folders, sharing, download
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/drive/items", get(handlers::item::list_items))
        .route("/drive/items/upload", post(handlers::item::upload_item))
        .route("/drive/folders", post(handlers::item::create_folder))
        .route("/drive/items/{id}", get(handlers::item::get_item))
        .route("/drive/items/{id}", delete(handlers::item::delete_item))
        .route(
            "/drive/items/{id}/rename",
            put(handlers::item::rename_item),
        )
        .route("/drive/items/{id}/share", post(handlers::item::share_item))
        .route(
            "/drive/items/{id}/permissions",
            get(handlers::item::list_permissions),
        )
        .route(
            "/drive/items/{id}/permissions/{perm_id}",
            delete(handlers::item::remove_permission),
        )
        .route(
            "/drive/items/{id}/download",
            get(handlers::item::download_item),
        )
}

/// Liveness endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
