use std::net::SocketAddr;

use anyhow::Context;

use account_service::{
    auth::TokenSettings,
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    media::build_media_store,
    routes::app,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        eprintln!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging);

    let db_cfg = cfg
        .database
        .as_ref()
        .context("database.url is required (APP_DATABASE__URL)")?;
    let auth_cfg = cfg
        .auth
        .as_ref()
        .context("auth secrets are required (APP_AUTH__ACCESS_TOKEN_SECRET, APP_AUTH__REFRESH_TOKEN_SECRET)")?;

    let db = connection::connect(db_cfg).await?;
    let tokens = TokenSettings::from_config(auth_cfg);
    let media = build_media_store(&cfg.media)?;

    let addr: SocketAddr = format!("{}:{}", cfg.general.host, cfg.general.port)
        .parse()
        .context("invalid host/port")?;

    let state = AppState::new(cfg, db, tokens, media);
    let app = app(state);

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
