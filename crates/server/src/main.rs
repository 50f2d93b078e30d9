//! pagelens-mcp server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use pagelens_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "render")]
mod browser;
mod handler;
#[cfg(feature = "render")]
mod session;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        endpoint = %config.endpoint,
        render_enabled = config.render_enabled,
        "Starting pagelens-mcp server on stdio transport"
    );

    let handler = handler::PageLensServer::new(config)?;
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
