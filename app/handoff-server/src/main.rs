use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use handoff_api::state::AppState;
use handoff_core::repositories::PendingSessionRepository;
use handoff_core::services::HandoffService;
use handoff_infrastructure::database::connection;
use handoff_infrastructure::PgPendingSessionRepository;
use handoff_security::SessionService;
use handoff_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    handoff_shared::telemetry::init_telemetry();

    info!("Handoff server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to Database
    info!("Connecting to database...");
    let pool =
        connection::create_pool(&config.database.url, config.database.max_connections).await?;
    connection::run_migrations(&pool).await?;
    info!("Database connection established.");

    let repo = Arc::new(PgPendingSessionRepository::new(pool));

    let service = Arc::new(HandoffService::new(
        Arc::clone(&repo),
        SessionService::new(
            config.session.secret.clone(),
            config.session.access_token_expiry,
            config.session.refresh_token_expiry,
        ),
        config.handoff.pending_ttl_seconds,
    ));

    // Expiry sweeper: consumed and abandoned pending sessions are deleted
    // once past their TTL plus the retention window.
    spawn_expiry_sweeper(
        Arc::clone(&repo),
        config.handoff.retention_seconds,
        config.handoff.sweep_interval_seconds,
    );

    // Build router
    let app = handoff_api::router(AppState { service })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_expiry_sweeper<R: PendingSessionRepository + 'static>(
    repo: Arc<R>,
    retention_seconds: i64,
    interval_seconds: u64,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        loop {
            interval.tick().await;
            match repo.purge_expired(retention_seconds).await {
                Ok(0) => {}
                Ok(purged) => info!("Purged {} expired pending sessions", purged),
                Err(e) => warn!("Pending session sweep failed: {}", e),
            }
        }
    });
}
