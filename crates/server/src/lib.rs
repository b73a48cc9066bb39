//! Originality Server - HTTP REST API for AI-likelihood scoring
//!
//! This crate exposes the `scorer` crate over HTTP. It supports:
//!
//! - **Originality checks**: score a text from 0 (human) to 100 (machine)
//! - **Paraphrasing**: rewrite a text, diff it against the original and re-score it
//! - **Health & Metrics**: liveness/readiness probes (with provider circuit
//!   state) and Prometheus metrics
//!
//! # Features
//!
//! - **Authentication**: optional API keys with a per-key rate limit
//! - **Middleware**: compression, CORS, request ID tracking, structured logging
//! - **Configuration**: `.env`, `originality-server.{toml,yaml,json}` and
//!   `ORIGINALITY__*` environment variables
//! - **Graceful Shutdown**: SIGTERM and Ctrl+C
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints (No Authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Protected Endpoints (API Key Required When Configured)
//!
//! - `POST /api/v1/originality` - Score a text
//! - `POST /api/v1/paraphrase` - Paraphrase a text, optionally re-scoring it

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
