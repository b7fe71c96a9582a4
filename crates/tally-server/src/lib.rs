//! HTTP server assembly for Tally: configuration and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::{day::ReferenceZone, store::HabitStore, tracker::Tracker};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// IANA name of the reference time zone for calendar days.
  #[serde(default = "default_timezone")]
  pub timezone:   String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("tally.db") }

fn default_timezone() -> String { "UTC".to_string() }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
      timezone:   default_timezone(),
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `TALLY_*` variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("TALLY"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn reference_zone(&self) -> anyhow::Result<ReferenceZone> {
    self
      .timezone
      .parse::<ReferenceZone>()
      .with_context(|| format!("invalid timezone in config: {:?}", self.timezone))
  }

  /// The store path with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, plus `/health`.
pub fn router<S>(tracker: Arc<Tracker<S>>) -> Router
where
  S: HabitStore + 'static,
{
  let zone = tracker.zone();
  Router::new()
    .route("/health", get(move || health(zone)))
    .nest("/api", tally_api::api_router(tracker))
    .layer(TraceLayer::new_for_http())
}

async fn health(zone: ReferenceZone) -> Json<Value> {
  Json(json!({ "status": "ok", "timezone": zone.name() }))
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tally_core::memory::MemoryStore;
  use tower::ServiceExt as _;

  #[test]
  fn config_defaults_apply_to_missing_keys() {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 9001\ntimezone = \"Europe/Berlin\"",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();

    assert_eq!(cfg.port, 9001);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.store_path, PathBuf::from("tally.db"));
    assert_eq!(cfg.reference_zone().unwrap().name(), "Europe/Berlin");
    assert_eq!(cfg.address(), "127.0.0.1:9001");
  }

  #[test]
  fn bad_timezone_is_reported() {
    let cfg = ServerConfig { timezone: "Nowhere/Special".into(), ..ServerConfig::default() };
    let err = cfg.reference_zone().unwrap_err();
    assert!(err.to_string().contains("Nowhere/Special"));
  }

  #[test]
  fn tilde_is_expanded_against_home() {
    let path = expand_tilde(Path::new("relative/tally.db"));
    assert_eq!(path, PathBuf::from("relative/tally.db"));

    if let Ok(home) = std::env::var("HOME") {
      let path = expand_tilde(Path::new("~/tally.db"));
      assert_eq!(path, PathBuf::from(home).join("tally.db"));
    }
  }

  #[tokio::test]
  async fn health_and_api_are_mounted() {
    let tracker = Arc::new(Tracker::new(MemoryStore::new(), ReferenceZone::UTC));
    let app = router(tracker);

    let resp = app
      .clone()
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
      .oneshot(Request::builder().uri("/api/habits").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
