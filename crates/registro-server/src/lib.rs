//! HTTP server assembly for registro.
//!
//! Loads [`ServerConfig`] and wraps the JSON API router with request tracing.
//! The binary in `main.rs` wires these to a SQLite store.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use registro_core::store::RecordStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Layered from built-in defaults, an optional TOML file, and `REGISTRO_*`
/// environment variables (e.g. `REGISTRO_PORT=9000`), later layers winning.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl ServerConfig {
  pub fn load(file: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8000_i64)?
      .set_default("store_path", "registro.db")?
      .add_source(config::File::from(file.into()).required(false))
      .add_source(config::Environment::with_prefix("REGISTRO"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router: the JSON API plus an HTTP trace layer.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: RecordStore + 'static,
{
  registro_api::api_router(store).layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
