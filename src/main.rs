pub mod config;
pub mod error;
pub mod http_probe;
pub mod logging;
pub mod server;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Loaded before the subscriber so RUST_LOG may come from .env as well.
    let dotenv = dotenvy::dotenv();
    logging::init_tracing();
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = config::app_config::load_config().inspect_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
    })?;

    server::run(config).await
}
