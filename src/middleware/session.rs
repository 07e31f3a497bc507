use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    db::projections::PublicUser, error::AppError, routes::cookies::ACCESS_TOKEN_COOKIE,
    services::ServiceContext, state::AppState,
};

/// The authenticated caller, attached by `require_session`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PublicUser);

/// Resolves the access token to a live user or rejects the request before
/// the handler runs. Expired tokens are not refreshed here.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = access_token_from(req.headers())
        .ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;

    let services = ServiceContext::from_state(&state);
    let claims = services.tokens(&state.tokens).verify_access(&token)?;
    let user_id = claims.user_id()?;

    let user = services.user().find_public(&user_id).await?.ok_or_else(|| {
        tracing::debug!(%user_id, "access token subject no longer exists");
        AppError::unauthorized("Invalid access token")
    })?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Cookie first, then `Authorization: Bearer`.
fn access_token_from(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Unauthorized request"))
    }
}
