use parlor::{Server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("parlor=info")),
        )
        .init();

    let mut config = ServerConfig::default();
    if let Ok(port) = std::env::var("PORT") {
        config.bind_addr = format!("0.0.0.0:{port}");
    }

    let server = Server::bind(config).await?;
    tracing::info!(addr = %server.local_addr()?, "parlor server running");
    server.run().await?;
    Ok(())
}
