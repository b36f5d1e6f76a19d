//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use kernel::error::app_error::AppError;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voting::domain::repository::{GameCatalog, SessionStore};
use voting::{
    ActionThrottle, CatalogBackend, MemoryGameCatalog, MemorySessionStore, RemoteGameCatalog,
    SessionCookie, SoapCatalogClient, SystemClock, VotingAppState, VotingConfig, VotingService,
    voting_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,voting=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Misconfiguration is fatal: never serve with a guessed limit or catalog
    let config = VotingConfig::from_env().context("Invalid voting configuration")?;

    tracing::info!(
        max_actions_per_day = config.throttle.max_actions_per_day,
        blackout_days = ?config.throttle.blackout_days,
        "Voting configuration loaded"
    );

    let sessions = Arc::new(MemorySessionStore::new());
    spawn_session_sweeper(
        sessions.clone(),
        config.session.ttl,
        config.session.sweep_interval,
    );

    let voting = match &config.catalog {
        CatalogBackend::Memory => {
            tracing::info!("Using in-memory game catalog");
            voting_api(MemoryGameCatalog::new(), sessions, &config)
        }
        CatalogBackend::Remote(remote) => {
            let client =
                SoapCatalogClient::new(remote).context("Failed to build catalog service client")?;
            let catalog = RemoteGameCatalog::new(client, remote.api_key.clone());

            if remote.verify_key {
                catalog
                    .verify_key()
                    .await
                    .context("Catalog service rejected the configured API key")?;
                tracing::info!("Catalog API key verified");
            }

            tracing::info!(url = %remote.url, "Using remote game catalog");
            voting_api(catalog, sessions, &config)
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", voting)
        .fallback(|| async { AppError::not_found("No such endpoint.") })
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("LISTEN_ADDR must be an address like 0.0.0.0:31113")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire the voting use cases for the selected catalog
fn voting_api<C>(catalog: C, sessions: Arc<MemorySessionStore>, config: &VotingConfig) -> Router
where
    C: GameCatalog + Sync + 'static,
{
    let voting = VotingService::new(Arc::new(catalog));
    let throttle = ActionThrottle::new(
        sessions,
        Arc::new(config.throttle.clone()),
        Arc::new(SystemClock),
    );

    voting_router(
        VotingAppState::new(voting, throttle),
        SessionCookie::new(&config.session),
    )
}

/// Periodically drop sessions idle for longer than `ttl`
fn spawn_session_sweeper(sessions: Arc<MemorySessionStore>, ttl: Duration, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = sessions.cleanup_idle(ttl).await {
                tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
            }
        }
    });
}
