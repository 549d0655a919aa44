use std::sync::Arc;

use tracing::info;

use jsonguard_server::{build_router, AppState};

fn load_config() -> jsonguard_core::Config {
    jsonguard_core::config::load_dotenv();
    jsonguard_core::Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = load_config();
    config.log_summary();

    let state = Arc::new(AppState::from_config(&config)?);
    let app = build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
