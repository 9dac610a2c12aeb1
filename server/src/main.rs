use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use surgery_server::{app, config::ServerConfig, seed::seed, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::new(&config.jwt_secret, config.bcrypt_cost);
    seed(&state)?;

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "surgery backend listening");
    axum::serve(listener, app(state, config.client_url.as_deref())).await?;
    Ok(())
}
