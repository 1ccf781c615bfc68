use sl_board::config::{Config, MOCK_DIR_VAR};
use sl_board::engine::{Engine, run};
use sl_board::logging::init_logging;
use sl_board::sl::{DepartureFeed, MockSlClient, SlClient, SlConfig};
use sl_board::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");

    // SL_MOCK_DIR switches to canned responses; no API key needed
    match std::env::var(MOCK_DIR_VAR) {
        Ok(dir) => {
            tracing::info!("Using mock SL data from {dir}");
            let mock = MockSlClient::from_dir(&dir).expect("Failed to load mock data");
            tracing::info!("Mock data for sites {:?}", mock.available_sites().await);
            serve(config, mock).await;
        }
        Err(_) => {
            let api_key = config
                .require_api_key()
                .expect("Missing SL API key")
                .to_string();
            let client = SlClient::new(SlConfig::new(api_key)).expect("Failed to create SL client");
            serve(config, client).await;
        }
    }
}

async fn serve<F: DepartureFeed>(config: Config, feed: F) {
    let mut engine = Engine::new(feed, config.site_specs(), config.now_token.clone());
    let app = create_router(AppState::new(engine.table()));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind HTTP listener");

    tracing::info!("SL departure boards listening on http://{}", config.bind);
    tracing::info!("  GET  /health        - Health check");
    tracing::info!("  GET  /sites         - Per-site fetch status");
    tracing::info!("  GET  /boards        - All boards");
    tracing::info!("  GET  /boards/:name  - One board (?limit=N)");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server stopped: {e}");
        }
    });

    run(&mut engine, config.tick_interval).await;
}
