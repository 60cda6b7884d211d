//! Redação Tática · Essay Trainer Backend
//!
//! - Axum HTTP API
//! - Optional Gemini integration (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   GEMINI_API_KEY       : enables model integration if present
//!   GEMINI_BASE_URL      : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_FAST_MODEL    : default "gemini-1.5-flash" (mission generation)
//!   GEMINI_STRONG_MODEL  : default "gemini-1.5-pro" (evaluation, transcription)
//!   SUPABASE_URL         : remote history store (optional)
//!   SUPABASE_SERVICE_KEY : remote history store (optional)
//!   HISTORY_CACHE_PATH   : local history cache, default "./data/history.json"
//!   AGENT_CONFIG_PATH    : path to TOML config (prompts + optional theme bank)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod pools;
mod state;
mod protocol;
mod mission;
mod analyzer;
mod logic;
mod gemini;
mod history;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (pools, clients, history store).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "redacao_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
