use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    auth::{TokenService, TokenSettings},
    db::dao::DaoContext,
    services::{channel_service::ChannelService, user_service::UserService},
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user())
    }

    pub fn channel(&self) -> ChannelService {
        ChannelService::new(self.daos.clone())
    }

    pub fn tokens(&self, settings: &Arc<TokenSettings>) -> TokenService {
        TokenService::new(self.user(), Arc::clone(settings))
    }

    pub fn daos(&self) -> &DaoContext {
        &self.daos
    }
}
