//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use driveport_auth::jwt::JwtDecoder;
use driveport_core::config::AppConfig;
use driveport_database::DatabasePool;
use driveport_service::item::ItemService;
use driveport_service::user::UserService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db: DatabasePool,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Registration, login, and member management.
    pub user_service: Arc<UserService>,
    /// Guarded Drive item operations.
    pub item_service: Arc<ItemService>,
}
