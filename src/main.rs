use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use footfall::analytics::build_geo_lookup;
use footfall::api::{self, AppState};
use footfall::auth::AuthService;
use footfall::config::Config;
use footfall::i18n::Translations;
use footfall::storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Load message catalogs before anything else can fail on a missing key
    let translations = Arc::new(Translations::load()?);
    let mut languages: Vec<_> = translations.languages().collect();
    languages.sort_unstable();
    info!("Loaded message catalogs: {}", languages.join(", "));

    // Initialize storage
    info!("Initializing database...");
    let storage = storage::connect(&config.database).await?;
    info!("Database initialized successfully");

    let geo = build_geo_lookup(&config.geo)?;
    let auth_service = Arc::new(AuthService::new(config.auth.api_key.clone()));
    info!("🔐 API key authentication enabled for /api routes");

    let state = Arc::new(AppState::new(
        storage,
        geo,
        translations,
        config.proxy.trusted_proxies.clone(),
    ));

    let api_router = api::create_api_router(state, auth_service, config.frontend.clone());

    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving landing page from directory: {}", static_dir);
    } else {
        info!("🎨 Serving embedded landing page");
    }

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);
    info!("   - API endpoints available at http://{}/api/{{lang}}/...", api_addr);

    axum::serve(
        api_listener,
        api_router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
