use std::{path::PathBuf, sync::Arc};

use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

use crate::{
    auth::TokenSettings,
    config::{AppConfig, AuthConfig},
    db::connection::sync_schema,
    media::{LocalMediaStore, MediaStore},
    routes::app,
    state::AppState,
};

pub const TEST_ACCESS_SECRET: &str = "test-access-secret";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret";

/// Fresh in-memory SQLite database with the schema synced from the entities.
/// One pooled connection, so every query sees the same database.
pub async fn sqlite_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("connect in-memory sqlite");
    sync_schema(&db).await.expect("sync test schema");
    db
}

/// Config with fixed secrets and media directories under a unique temp root.
pub fn test_config() -> AppConfig {
    let root = std::env::temp_dir().join(format!("account_service-{}", Uuid::new_v4()));
    let mut cfg = AppConfig::default();
    cfg.auth = Some(AuthConfig {
        access_token_secret: TEST_ACCESS_SECRET.to_string(),
        access_token_ttl_secs: 15 * 60,
        refresh_token_secret: TEST_REFRESH_SECRET.to_string(),
        refresh_token_ttl_secs: 24 * 60 * 60,
    });
    cfg.media.staging_dir = root.join("staging");
    cfg.media.public_dir = root.join("public");
    cfg
}

pub async fn test_state() -> Arc<AppState> {
    let cfg = test_config();
    let db = sqlite_db().await;
    let tokens = TokenSettings::from_config(cfg.auth.as_ref().expect("test auth config"));
    let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(
        cfg.media.public_dir.clone(),
        cfg.media.public_base_url.clone(),
    ));
    AppState::new(cfg, db, tokens, media)
}

/// The fully layered application over a fresh database.
pub async fn test_app() -> (Router, Arc<AppState>) {
    let state = test_state().await;
    (app(Arc::clone(&state)), state)
}

pub fn staging_dir(state: &AppState) -> PathBuf {
    state.config.media.staging_dir.clone()
}
