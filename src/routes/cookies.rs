use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{auth::TokenPair, config::CookieConfig};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

pub fn with_session(jar: CookieJar, tokens: &TokenPair, cfg: &CookieConfig) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        cfg,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        cfg,
    ))
}

/// Emits expired cookies even when the request carried none, so the client
/// always drops its copies.
pub fn without_session(jar: CookieJar, cfg: &CookieConfig) -> CookieJar {
    jar.add(removal_cookie(ACCESS_TOKEN_COOKIE, cfg))
        .add(removal_cookie(REFRESH_TOKEN_COOKIE, cfg))
}

fn removal_cookie(name: &'static str, cfg: &CookieConfig) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new(), cfg);
    cookie.make_removal();
    cookie
}

fn session_cookie(name: &'static str, value: String, cfg: &CookieConfig) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(cfg.secure)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}
