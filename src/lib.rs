pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod import;
pub mod models;
pub mod suggest;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Initialize tracing with `RUST_LOG`, falling back to the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Load the catalog once and serve until Ctrl-C.
pub async fn run(config: config::ServerConfig) -> Result<(), api::ServerError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let core = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || core_state::CoreState::initialize(&config))
            .await
            .map_err(api::ServerError::Startup)?
    };

    let listener = api::bind(config.bind_addr).await?;
    api::serve(Arc::new(core), listener, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown requested");
    })
    .await
}
