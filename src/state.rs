use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::TokenSettings, config::AppConfig, media::MediaStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenSettings>,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        tokens: TokenSettings,
        media: Arc<dyn MediaStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            tokens: Arc::new(tokens),
            media,
        })
    }
}
