//! Originality Server - HTTP REST API for AI-likelihood scoring
//!
//! Loads `.env`, the optional config file and `ORIGINALITY__*` variables,
//! then serves until shut down.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
