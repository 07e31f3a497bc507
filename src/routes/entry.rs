use std::sync::Arc;

use axum::{Router, middleware};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    media::MediaProviderId,
    middleware::{catch_panic_layer, json_error_middleware},
    state::AppState,
};

use super::users;

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new().nest("/users", users::router(state.clone()));
    let router = Router::new().nest(API_PREFIX, api);

    let media = &state.config.media;
    if media.provider == MediaProviderId::Local && media.public_base_url.starts_with('/') {
        let mount = media.public_base_url.trim_end_matches('/');
        if !mount.is_empty() {
            return router.nest_service(mount, ServeDir::new(&media.public_dir));
        }
    }
    router
}

/// The full service: routes plus the error envelope, panic and trace layers.
pub fn app(state: Arc<AppState>) -> Router {
    router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
}
