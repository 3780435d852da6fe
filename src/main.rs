//! flatwiki - minimal personal wiki over flat text files
//!
//! Server entry point

use anyhow::Context as _;
use flatwiki::{ServerConfig, WikiServer};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flatwiki=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = ServerConfig::default();
    let server = WikiServer::new(config).context("failed to load templates")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { server.run().await.map_err(|e| anyhow::anyhow!(e)) })?;

    Ok(())
}
