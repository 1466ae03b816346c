use std::sync::Arc;

use screenscout::{
    config::Config,
    db::Store,
    routes::{create_router, AppState},
    services::{
        catalog::TmdbCatalog, discovery::AiSearchClient, orchestrator::DiscoverySettings,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screenscout=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    // A missing database degrades reads to empty; the process still serves.
    let store = Store::connect(&config.database_url).await;
    if !store.is_connected() {
        tracing::warn!("Serving without persistent storage");
    }

    let discovery = AiSearchClient::new(
        config.ai_api_key.clone(),
        config.ai_api_url.clone(),
        config.ai_model.clone(),
    );
    let catalog = TmdbCatalog::new(config.catalog_api_key.clone(), config.catalog_api_url.clone());

    let state = AppState {
        store,
        discovery: Arc::new(discovery),
        catalog: Arc::new(catalog),
        settings: DiscoverySettings::from_config(&config),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
