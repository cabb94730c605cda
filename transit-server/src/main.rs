use tracing::info;
use tracing_subscriber::EnvFilter;

use transit_server::config::ServerConfig;
use transit_server::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "transit_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Building from GTFS can take a while on a full feed
    let network = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || config.load_network()).await??
    };

    let state = AppState::new(network, config.search.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Transit router listening");
    info!("  GET  /health                      - Health check");
    info!("  GET  /stops?q=                    - Search stops");
    info!("  GET  /route?from=&to=[&weight=&heuristic=] - Find a route");

    axum::serve(listener, app).await?;
    Ok(())
}
