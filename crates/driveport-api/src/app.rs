//! Application builder — wires repositories, the authorization core, the
//! Drive client, and services into the Axum app, then runs the server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::info;

use driveport_auth::hierarchy::HierarchyDirectory;
use driveport_auth::jwt::{JwtDecoder, JwtEncoder};
use driveport_auth::password::PasswordHasher;
use driveport_auth::store::{DirectoryStore, LedgerStore};
use driveport_auth::visibility::guard::AccessGuard;
use driveport_auth::visibility::resolver::VisibilityResolver;
use driveport_core::config::AppConfig;
use driveport_core::error::AppError;
use driveport_core::traits::drive::DriveClient;
use driveport_database::DatabasePool;
use driveport_database::repositories::{AccountRepository, LedgerRepository};
use driveport_drive::{GoogleDriveClient, OAuthTokenSource};
use driveport_service::item::{AutoSharePolicy, ItemService};
use driveport_service::user::UserService;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the application state from configuration and a connected pool.
pub fn build_state(config: AppConfig, db: DatabasePool) -> Result<AppState, AppError> {
    let config = Arc::new(config);

    // ── Repositories ─────────────────────────────────────────────
    let account_repo = Arc::new(AccountRepository::new(db.pool().clone()));
    let ledger_repo = Arc::new(LedgerRepository::new(db.pool().clone()));

    // ── Drive client ─────────────────────────────────────────────
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.drive.request_timeout_seconds))
        .build()
        .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;
    let token_source = Arc::new(OAuthTokenSource::new(http.clone(), config.drive.clone()));
    let drive: Arc<dyn DriveClient> = Arc::new(GoogleDriveClient::new(
        http,
        config.drive.clone(),
        token_source,
    ));

    if !config.drive.is_configured() {
        tracing::warn!(
            "Drive credentials are not configured; Drive endpoints will answer NOT_CONFIGURED"
        );
    }

    // ── Authorization core ───────────────────────────────────────
    let directory = HierarchyDirectory::new(account_repo.clone() as Arc<dyn DirectoryStore>);
    let resolver = VisibilityResolver::new(directory.clone());
    let guard = AccessGuard::new(
        resolver.clone(),
        ledger_repo.clone() as Arc<dyn LedgerStore>,
    );
    let autoshare = AutoSharePolicy::new(
        directory,
        ledger_repo.clone() as Arc<dyn LedgerStore>,
        drive.clone(),
    );

    // ── Auth stack ───────────────────────────────────────────────
    let password_hasher = Arc::new(PasswordHasher::new());
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    // ── Services ─────────────────────────────────────────────────
    let user_service = Arc::new(UserService::new(
        account_repo,
        resolver,
        password_hasher,
        jwt_encoder,
        jwt_decoder.clone(),
        config.auth.clone(),
    ));
    let item_service = Arc::new(ItemService::new(
        guard,
        ledger_repo as Arc<dyn LedgerStore>,
        drive,
        autoshare,
        config.drive.root_folder_id.clone(),
    ));

    Ok(AppState {
        config,
        db,
        jwt_decoder,
        user_service,
        item_service,
    })
}

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the DrivePort server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting DrivePort server...");

    let db = DatabasePool::connect(&config.database).await?;
    driveport_database::migration::run_migrations(db.pool()).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = build_state(config, db.clone())?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "DrivePort listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    let _ = tokio::signal::ctrl_c().await;
    info!(
        grace_seconds = grace.as_secs(),
        "Shutdown signal received; draining connections"
    );
}
