use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comicdex_core::{
    load_config, spawn_event_indexer, spawn_timer_indexer, validate_config, ComicCatalog,
    EnglishNormalizer, EventBus, Normalizer, SearchService, SqliteCatalog, TokenService,
    UpdateService, XkcdClient,
};

use comicdex_server::api::create_router;
use comicdex_server::api::middleware::{ConcurrencyLimiter, RateLimiter};
use comicdex_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("COMICDEX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.yaml"));

    // Load configuration
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    // Initialize logging; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Configuration loaded from {:?}", config_path);

    // Wire up the core services
    let catalog: Arc<dyn ComicCatalog> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to open catalog database")?,
    );
    let normalizer: Arc<dyn Normalizer> = Arc::new(EnglishNormalizer::new());
    let source = Arc::new(
        XkcdClient::new(&config.upstream.url, config.upstream.timeout())
            .context("Failed to create upstream client")?,
    );
    let events = EventBus::new();

    let updater = Arc::new(
        UpdateService::new(
            Arc::clone(&catalog),
            source,
            Arc::clone(&normalizer),
            events.clone(),
            config.updater.concurrency,
        )
        .context("Failed to create update service")?,
    );
    let search = Arc::new(SearchService::new(
        Arc::clone(&catalog),
        Arc::clone(&normalizer),
    ));

    // Index refresh drivers run until shutdown
    let shutdown = CancellationToken::new();
    spawn_timer_indexer(
        Arc::clone(&search),
        config.search.index_ttl(),
        shutdown.clone(),
    );
    spawn_event_indexer(
        Arc::clone(&search),
        &events,
        config.search.event_debounce(),
        shutdown.clone(),
    );

    let tokens = Arc::new(TokenService::new(
        &config.auth.admin_user,
        &config.auth.admin_password,
        config.auth.token_ttl(),
    ));

    let state = Arc::new(AppState::new(
        updater,
        search,
        tokens,
        catalog,
        normalizer,
        ConcurrencyLimiter::new(config.search.concurrency_limit),
        RateLimiter::new(config.search.rate_rps, config.search.rate_wait()),
    ));

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let graceful_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            graceful_shutdown.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("Server error")?;

    Ok(())
}
