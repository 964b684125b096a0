use std::sync::Arc;

use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use agentdeck_core::client::AgentexClient;
use agentdeck_core::config::Config;
use agentdeck_server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentdeck_server=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let client = AgentexClient::with_timeout(
        config.base_url.clone(),
        std::time::Duration::from_secs(config.request_timeout_s),
    )?;
    info!("Proxying to agent service at {}", client.base_url());

    let state = Arc::new(AppState { client });

    let dashboard_dir = config.dashboard_dist_dir.clone();
    let serve_dir = ServeDir::new(&dashboard_dir)
        .fallback(ServeFile::new(format!("{dashboard_dir}/index.html")));

    let app = router(state).fallback_service(serve_dir);

    let addr = format!("{}:{}", config.web_bind, config.web_port);
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
