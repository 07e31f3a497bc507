use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    auth::TokenPair,
    db::projections::PublicUser,
    error::AppError,
    middleware::{CurrentUser, require_session},
    response::{ApiResult, JsonApiResponse},
    routes::{
        cookies::{REFRESH_TOKEN_COOKIE, with_session, without_session},
        multipart::MultipartForm,
    },
    services::{
        ServiceContext,
        auth_service::{AuthService, LoginOutcome, RegistrationForm},
        channel_service::{ChannelProfile, WatchedVideo},
    },
    state::AppState,
};

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route(
            "/register",
            post(register).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token));

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/current-user", get(current_user))
        .route("/update-account", patch(update_account))
        .route(
            "/avatar",
            patch(update_avatar).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/cover-image",
            patch(update_cover_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/c/{username}", get(channel_profile))
        .route("/history", get(watch_history))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    public.merge(protected).with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<PublicUser> {
    let mut form = MultipartForm::parse(multipart, &state.config.media.staging_dir).await?;
    let registration = RegistrationForm {
        username: form.text("username"),
        email: form.text("email"),
        password: form.text("password"),
        full_name: form.text("fullName"),
        avatar: form.take_file("avatar"),
        cover_image: form.take_file("coverImage"),
    };

    let services = ServiceContext::from_state(&state);
    let (users, tokens) = (services.user(), services.tokens(&state.tokens));
    let user = AuthService::new(&users, &tokens, state.media.as_ref())
        .register(registration)
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "User registered successfully", user)
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, JsonApiResponse<LoginOutcome>), AppError> {
    let services = ServiceContext::from_state(&state);
    let (users, tokens) = (services.user(), services.tokens(&state.tokens));
    let outcome = AuthService::new(&users, &tokens, state.media.as_ref())
        .login(body.username.as_deref(), body.email.as_deref(), &body.password)
        .await?;

    let jar = with_session(jar, &outcome.tokens, &state.config.cookies);
    let response = JsonApiResponse::with_status(StatusCode::OK, "User logged in successfully", outcome)?;
    Ok((jar, response))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, JsonApiResponse<Value>), AppError> {
    let services = ServiceContext::from_state(&state);
    let (users, tokens) = (services.user(), services.tokens(&state.tokens));
    AuthService::new(&users, &tokens, state.media.as_ref())
        .logout(&user.id)
        .await?;

    let jar = without_session(jar, &state.config.cookies);
    let response = JsonApiResponse::with_status(StatusCode::OK, "User logged out", json!({}))?;
    Ok((jar, response))
}

/// Accepts the refresh token from the cookie or a JSON `refreshToken` field.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, JsonApiResponse<TokenPair>), AppError> {
    let from_body = serde_json::from_slice::<RefreshRequest>(&body)
        .unwrap_or_default()
        .refresh_token;
    let incoming = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.trim().is_empty())
        .or(from_body);

    let services = ServiceContext::from_state(&state);
    let (users, tokens) = (services.user(), services.tokens(&state.tokens));
    let pair = AuthService::new(&users, &tokens, state.media.as_ref())
        .refresh(incoming.as_deref())
        .await?;

    let jar = with_session(jar, &pair, &state.config.cookies);
    let response = JsonApiResponse::with_status(StatusCode::OK, "Access token refreshed", pair)?;
    Ok((jar, response))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<Value> {
    ServiceContext::from_state(&state)
        .user()
        .change_password(&user.id, &body.old_password, &body.new_password)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "Password changed successfully", json!({}))
}

async fn current_user(CurrentUser(user): CurrentUser) -> ApiResult<PublicUser> {
    JsonApiResponse::with_status(StatusCode::OK, "Current user fetched successfully", user)
}

async fn update_account(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateAccountRequest>,
) -> ApiResult<PublicUser> {
    let updated = ServiceContext::from_state(&state)
        .user()
        .update_account_details(&user.id, &body.full_name, &body.email)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "Account details updated", updated)
}

async fn update_avatar(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> ApiResult<PublicUser> {
    let mut form = MultipartForm::parse(multipart, &state.config.media.staging_dir).await?;
    let updated = ServiceContext::from_state(&state)
        .user()
        .update_avatar(&user.id, form.take_file("avatar"), state.media.as_ref())
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "Avatar updated successfully", updated)
}

async fn update_cover_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> ApiResult<PublicUser> {
    let mut form = MultipartForm::parse(multipart, &state.config.media.staging_dir).await?;
    let updated = ServiceContext::from_state(&state)
        .user()
        .update_cover_image(&user.id, form.take_file("coverImage"), state.media.as_ref())
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "Cover image updated successfully", updated)
}

async fn channel_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(viewer): CurrentUser,
    Path(username): Path<String>,
) -> ApiResult<ChannelProfile> {
    let profile = ServiceContext::from_state(&state)
        .channel()
        .channel_profile(&username, Some(viewer.id))
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "User channel fetched successfully", profile)
}

async fn watch_history(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<WatchedVideo>> {
    let history = ServiceContext::from_state(&state)
        .channel()
        .watch_history(&user.id)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "Watch history fetched successfully", history)
}
