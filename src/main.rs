//! Service entry point: configuration, wiring, and the axum server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::{middleware, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pulse_chat::adapters::auth::JwtTokenValidator;
use pulse_chat::adapters::http::chat::chat_router;
use pulse_chat::adapters::http::middleware::{auth_middleware, AuthState};
use pulse_chat::adapters::http::ChatAppState;
use pulse_chat::adapters::postgres::PgChatStore;
use pulse_chat::adapters::sse::{sse_router, SseState};
use pulse_chat::adapters::websocket::{websocket_router, WebSocketState};
use pulse_chat::application::PostMessageHandler;
use pulse_chat::config::AppConfig;
use pulse_chat::domain::chat::ChannelName;
use pulse_chat::ports::{ChatDirectory, MessageIngestion, TokenValidator};
use pulse_chat::realtime::{Broadcaster, ChannelRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    // Storage
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let store = Arc::new(PgChatStore::new(pool));
    let directory: Arc<dyn ChatDirectory> = store.clone();
    let ingestion: Arc<dyn MessageIngestion> = store;

    let default_channel = ChannelName::new(config.realtime.default_channel_name.clone())?;
    let seeded = directory.ensure_channel(&default_channel).await?;
    tracing::info!(channel_id = %seeded.id, name = %seeded.name, "default channel ready");

    // Fan-out core
    let registry = Arc::new(ChannelRegistry::new());
    let broadcaster = Broadcaster::new(Arc::clone(&registry));
    let post_message = Arc::new(PostMessageHandler::new(ingestion, broadcaster));

    // Auth
    let token_validator: Arc<dyn TokenValidator> =
        Arc::new(JwtTokenValidator::new(&config.auth.jwt_secret));
    let auth_state: AuthState = Arc::clone(&token_validator);

    // REST surface gets the request timeout; the live surfaces are
    // long-lived streams and must not.
    let rest = chat_router()
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(ChatAppState::new(
            directory,
            Arc::clone(&post_message),
            config.realtime.history_limit,
        ));

    let sse = sse_router().with_state(SseState::new(
        Arc::clone(&registry),
        config.realtime.sse_keep_alive(),
    ));

    let ws = websocket_router().with_state(WebSocketState::new(
        Arc::clone(&registry),
        post_message,
        token_validator,
    ));

    let app = Router::new()
        .merge(rest)
        .merge(sse)
        .merge(ws)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "pulse-chat listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&registry)))
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(config.server.log_level.clone());
    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Resolves when the process is asked to stop, after notifying every
/// live connection.
///
/// The registry shutdown runs *before* this future resolves so each
/// connected client drains its sentinel and closes cleanly while axum is
/// still serving; only then does graceful shutdown begin.
async fn shutdown_signal(registry: Arc<ChannelRegistry>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, closing live connections");
    registry.shutdown().await;
}
