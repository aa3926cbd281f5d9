//! HTTP host for EduCRM.
//!
//! Mounts the JSON API under `/api`, optionally serves the dashboard's static
//! files at `/`, and wraps everything in request tracing and CORS.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use educrm_core::store::EnrollmentStore;
use serde::Deserialize;
use tower_http::{
  cors::CorsLayer,
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `EDUCRM_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Directory served at `/`; `start.html` inside it is the landing page.
  pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "0.0.0.0".to_string(),
      port:       3000,
      store_path: PathBuf::from("database.db"),
      static_dir: None,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: EnrollmentStore + 'static,
{
  let mut app = Router::new().nest("/api", educrm_api::api_router(store));

  if let Some(dir) = &config.static_dir {
    app = with_static_files(app, dir);
  }

  app
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

fn with_static_files(app: Router, dir: &Path) -> Router {
  app
    .route_service("/", ServeFile::new(dir.join("start.html")))
    .fallback_service(ServeDir::new(dir))
}
