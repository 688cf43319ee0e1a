//! HTTP server wiring for Timbro.
//!
//! Mounts the JSON API under `/api` and the back office under `/api/admin`,
//! the latter behind HTTP Basic auth.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::{Path, PathBuf}, sync::Arc};

use axum::{Router, middleware};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use timbro_core::{
  merge::MergePolicy,
  service::{SubmissionRules, Timesheet},
  store::TimesheetStore,
};
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_admin};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TIMBRO_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  pub store_path:             PathBuf,
  pub admin_username:         String,
  pub admin_password_hash:    Option<String>,
  pub merge_policy:           MergePolicy,
  /// Employees may submit for today and this many days back.
  pub submission_window_days: u32,
  /// Accept submissions for any date.
  pub open_submissions:       bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                   "127.0.0.1".to_string(),
      port:                   8080,
      store_path:             PathBuf::from("timbro.sqlite3"),
      admin_username:         "admin".to_string(),
      admin_password_hash:    None,
      merge_policy:           MergePolicy::default(),
      submission_window_days: 1,
      open_submissions:       false,
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then layer the environment on top.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(Config::builder().add_source(File::from(path).required(false)))
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .add_source(Environment::with_prefix("TIMBRO"))
      .build()?
      .try_deserialize()
  }

  pub fn rules(&self) -> SubmissionRules {
    SubmissionRules {
      policy:      self.merge_policy,
      window_days: (!self.open_submissions).then_some(self.submission_window_days),
    }
  }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.admin_username.clone(),
      password_hash: self.admin_password_hash.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(timesheet: Arc<Timesheet<S>>, auth: Arc<AuthConfig>) -> Router
where
  S: TimesheetStore + 'static,
{
  let admin = timbro_api::admin_router(timesheet.clone())
    .layer(middleware::from_fn_with_state(auth, require_admin));

  Router::new()
    .nest("/api", timbro_api::api_router(timesheet).nest("/admin", admin))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use config::FileFormat;
  use rand_core::OsRng;
  use timbro_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn app(password: &str) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt  = SaltString::generate(&mut OsRng);
    let hash  = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    let config = ServerConfig {
      admin_password_hash: Some(hash),
      ..ServerConfig::default()
    };
    router(
      Arc::new(Timesheet::new(store, config.rules())),
      Arc::new(config.auth()),
    )
  }

  fn get(uri: &str, auth: Option<(&str, &str)>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some((user, pass)) = auth {
      builder = builder.header(
        header::AUTHORIZATION,
        format!("Basic {}", B64.encode(format!("{user}:{pass}"))),
      );
    }
    builder.body(Body::empty()).unwrap()
  }

  #[tokio::test]
  async fn employee_routes_are_open() {
    let resp = app("secret").await.oneshot(get("/api/employees", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn admin_routes_require_credentials() {
    let resp = app("secret")
      .await
      .oneshot(get("/api/admin/reference", None))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let resp = app("secret")
      .await
      .oneshot(get("/api/admin/reference", Some(("admin", "wrong"))))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app("secret")
      .await
      .oneshot(get("/api/admin/reference", Some(("admin", "secret"))))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(serde_json::from_slice::<serde_json::Value>(&bytes).unwrap(), serde_json::json!([]));
  }

  #[test]
  fn defaults_without_a_config_file() {
    let config = ServerConfig::from_builder(Config::builder()).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.admin_username, "admin");
    assert_eq!(config.rules(), SubmissionRules::default());
  }

  #[test]
  fn toml_overrides() {
    let toml = r#"
      port = 9000
      merge_policy = "accumulate"
      open_submissions = true
    "#;
    let config = ServerConfig::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.rules(), SubmissionRules {
      policy:      MergePolicy::Accumulate,
      window_days: None,
    });
  }
}
