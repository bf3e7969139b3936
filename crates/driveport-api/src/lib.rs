//! # driveport-api
//!
//! HTTP API layer for DrivePort: the Axum router, application state,
//! authentication extractor, middleware, DTOs, and handlers.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use state::AppState;
