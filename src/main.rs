use std::env;
use std::path::PathBuf;

use anyhow::anyhow;
use tokio::net::TcpListener;

use parlance::{routes, state::AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Optional first argument: path to a YAML configuration file.
    // Without it, configuration comes from environment variables alone.
    let mut args = env::args();
    let _ = args.next();
    let config = match args.next() {
        Some(path) => {
            if let Some(extra) = args.next() {
                anyhow::bail!("Unexpected argument '{extra}' after the config path");
            }
            let path = PathBuf::from(path);
            ServerConfig::from_file(&path)
                .map_err(|e| anyhow!("Failed to load configuration from {}: {e}", path.display()))?
        }
        None => {
            ServerConfig::from_env().map_err(|e| anyhow!("Failed to load configuration: {e}"))?
        }
    };

    let address = config.address();
    let state = AppState::new(config)?;
    let app = routes::api::create_api_router().with_state(state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("parlance listening on {}", address);
    axum::serve(listener, app).await?;

    Ok(())
}
