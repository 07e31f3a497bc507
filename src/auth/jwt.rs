use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use uuid::Uuid;

use super::{AccessClaims, RefreshClaims, TokenClaims, TokenError};
use crate::error::AppError;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

/// One key pair per token class, so an access token never verifies as a refresh token.
#[derive(Clone)]
pub struct TokenKeys {
    pub access: JwtKeys,
    pub refresh: JwtKeys,
}

impl TokenKeys {
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: JwtKeys::from_secret(access_secret),
            refresh: JwtKeys::from_secret(refresh_secret),
        }
    }
}

pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

pub fn make_access_claims(user_id: &Uuid, now: u64, ttl_secs: u64) -> AccessClaims {
    AccessClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now.saturating_add(ttl_secs),
        jti: Uuid::new_v4().to_string(),
    }
}

pub fn make_refresh_claims(user_id: &Uuid, now: u64, ttl_secs: u64) -> RefreshClaims {
    RefreshClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now.saturating_add(ttl_secs),
        jti: Uuid::new_v4().to_string(),
    }
}

pub fn encode_token<C: TokenClaims>(keys: &JwtKeys, claims: &C) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc).map_err(|err| {
        tracing::error!(error = %err, "token encoding failed");
        AppError::internal("Token encoding failed")
    })
}

/// Signature is checked by `jsonwebtoken`; expiry is checked here against `now`
/// with no leeway, so a token is expired at exactly `exp`.
pub fn decode_claims<C: TokenClaims>(
    keys: &JwtKeys,
    token: &str,
    now: u64,
) -> Result<C, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let data = decode::<C>(token, &keys.dec, &validation).map_err(|err| match err.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        _ => TokenError::Malformed,
    })?;

    if now >= data.claims.expires_at() {
        return Err(TokenError::Expired);
    }
    Ok(data.claims)
}
