use std::sync::Arc;

use uuid::Uuid;

use super::{
    AccessClaims, RefreshClaims, TokenPair,
    jwt::{TokenKeys, decode_claims, encode_token, make_access_claims, make_refresh_claims, now_unix},
};
use crate::{config::AuthConfig, error::AppError, services::user_service::UserService};

const REFRESH_REJECTED: &str = "Refresh token is expired or used";

/// Keys and lifetimes, built once from config and shared through `AppState`.
#[derive(Clone)]
pub struct TokenSettings {
    pub keys: TokenKeys,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl TokenSettings {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self {
            keys: TokenKeys::new(
                cfg.access_token_secret.as_bytes(),
                cfg.refresh_token_secret.as_bytes(),
            ),
            access_ttl_secs: cfg.access_token_ttl_secs,
            refresh_ttl_secs: cfg.refresh_token_ttl_secs,
        }
    }
}

/// Mints, verifies and rotates token pairs. The user row holds the single
/// refresh token that is currently allowed to rotate.
#[derive(Clone)]
pub struct TokenService {
    settings: Arc<TokenSettings>,
    users: UserService,
}

impl TokenService {
    pub fn new(users: UserService, settings: Arc<TokenSettings>) -> Self {
        Self { settings, users }
    }

    pub async fn issue_pair(&self, user_id: &Uuid) -> Result<TokenPair, AppError> {
        let now = now_unix();
        let access = make_access_claims(user_id, now, self.settings.access_ttl_secs);
        let refresh = make_refresh_claims(user_id, now, self.settings.refresh_ttl_secs);

        let pair = TokenPair {
            access_token: encode_token(&self.settings.keys.access, &access)?,
            refresh_token: encode_token(&self.settings.keys.refresh, &refresh)?,
        };

        self.users
            .set_refresh_token(user_id, Some(&pair.refresh_token))
            .await?;
        Ok(pair)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.verify_access_at(token, now_unix())
    }

    pub fn verify_access_at(&self, token: &str, now: u64) -> Result<AccessClaims, AppError> {
        Ok(decode_claims(&self.settings.keys.access, token, now)?)
    }

    pub async fn rotate(&self, incoming: &str) -> Result<TokenPair, AppError> {
        let claims: RefreshClaims = decode_claims(&self.settings.keys.refresh, incoming, now_unix())
            .map_err(|err| {
                tracing::debug!(reason = %err, "refresh token rejected");
                AppError::unauthorized(REFRESH_REJECTED)
            })?;

        let user_id = claims.user_id().map_err(|_| {
            tracing::debug!("refresh token subject is not a user id");
            AppError::unauthorized(REFRESH_REJECTED)
        })?;

        let user = self.users.find_record(&user_id).await?.ok_or_else(|| {
            tracing::debug!(%user_id, "refresh token subject no longer exists");
            AppError::unauthorized(REFRESH_REJECTED)
        })?;

        if user.refresh_token.as_deref() != Some(incoming) {
            tracing::warn!(%user_id, "refresh token reuse or stale token presented");
            return Err(AppError::unauthorized(REFRESH_REJECTED));
        }

        self.reissue(&user.id).await
    }

    /// `issue_pair` for rotation: a row deleted since the lookup is just
    /// another rejected refresh.
    async fn reissue(&self, user_id: &Uuid) -> Result<TokenPair, AppError> {
        self.issue_pair(user_id).await.map_err(|err| match err {
            AppError::NotFound(_) => {
                tracing::debug!(%user_id, "user removed during refresh rotation");
                AppError::unauthorized(REFRESH_REJECTED)
            }
            other => other,
        })
    }

    pub async fn revoke(&self, user_id: &Uuid) -> Result<(), AppError> {
        self.users.set_refresh_token(user_id, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::{TokenService, TokenSettings};
    use crate::{
        auth::jwt::{TokenKeys, now_unix},
        db::dao::{DaoBase, NewUserRecord, UserDao},
        error::AppError,
        services::user_service::UserService,
        test_helpers::sqlite_db,
    };

    fn settings() -> TokenSettings {
        TokenSettings {
            keys: TokenKeys::new(b"access-secret", b"refresh-secret"),
            access_ttl_secs: 60,
            refresh_ttl_secs: 600,
        }
    }

    async fn seeded() -> (TokenService, UserDao, Uuid) {
        let db = sqlite_db().await;
        let users = UserDao::new(&db);
        let user = users
            .create_user(NewUserRecord {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                full_name: "Alice".to_string(),
                avatar: "/media/a.png".to_string(),
                cover_image: None,
                password_hash: "digest".to_string(),
            })
            .await
            .expect("user should insert");
        let service = TokenService::new(UserService::new(users.clone()), Arc::new(settings()));
        (service, users, user.id)
    }

    #[tokio::test]
    async fn issue_pair_persists_the_refresh_token() {
        let (tokens, users, user_id) = seeded().await;

        let pair = tokens.issue_pair(&user_id).await.expect("pair should issue");
        let stored = users.find_by_id(user_id).await.expect("user should load");
        assert_eq!(stored.refresh_token.as_deref(), Some(pair.refresh_token.as_str()));

        let claims = tokens
            .verify_access(&pair.access_token)
            .expect("access token should verify");
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[tokio::test]
    async fn access_token_expires_at_exp() {
        let (tokens, _, user_id) = seeded().await;
        let pair = tokens.issue_pair(&user_id).await.expect("pair should issue");
        let claims = tokens
            .verify_access(&pair.access_token)
            .expect("access token should verify");

        assert!(tokens.verify_access_at(&pair.access_token, claims.exp - 1).is_ok());
        let err = tokens
            .verify_access_at(&pair.access_token, claims.exp)
            .expect_err("token should be expired at exp");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let (tokens, _, user_id) = seeded().await;
        let pair = tokens.issue_pair(&user_id).await.expect("pair should issue");

        assert!(tokens.verify_access(&pair.refresh_token).is_err());
        assert!(tokens.rotate(&pair.access_token).await.is_err());
    }

    #[tokio::test]
    async fn rotation_succeeds_once_then_detects_reuse() {
        let (tokens, users, user_id) = seeded().await;
        let first = tokens.issue_pair(&user_id).await.expect("pair should issue");

        let second = tokens
            .rotate(&first.refresh_token)
            .await
            .expect("first rotation should succeed");
        assert_ne!(second.refresh_token, first.refresh_token);

        let err = tokens
            .rotate(&first.refresh_token)
            .await
            .expect_err("reused token should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));

        let stored = users.find_by_id(user_id).await.expect("user should load");
        assert_eq!(
            stored.refresh_token.as_deref(),
            Some(second.refresh_token.as_str())
        );
    }

    #[tokio::test]
    async fn revoke_blocks_later_rotation() {
        let (tokens, users, user_id) = seeded().await;
        let pair = tokens.issue_pair(&user_id).await.expect("pair should issue");

        tokens.revoke(&user_id).await.expect("revoke should succeed");
        let stored = users.find_by_id(user_id).await.expect("user should load");
        assert!(stored.refresh_token.is_none());

        let err = tokens
            .rotate(&pair.refresh_token)
            .await
            .expect_err("rotation after logout should fail");
        assert_eq!(err.message(), "Refresh token is expired or used");
    }

    #[tokio::test]
    async fn rotation_for_unknown_user_is_unauthorized() {
        let (tokens, _, _) = seeded().await;
        let ghost = Uuid::new_v4();
        let claims = crate::auth::jwt::make_refresh_claims(&ghost, now_unix(), 600);
        let token = crate::auth::jwt::encode_token(&settings().keys.refresh, &claims)
            .expect("token should encode");

        let err = tokens.rotate(&token).await.expect_err("rotation should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn reissue_for_a_removed_user_is_a_rejected_refresh() {
        let (tokens, _, _) = seeded().await;
        let ghost = Uuid::new_v4();

        let direct = tokens
            .issue_pair(&ghost)
            .await
            .expect_err("issuing for a missing row should fail");
        assert!(matches!(direct, AppError::NotFound(_)));

        let err = tokens
            .reissue(&ghost)
            .await
            .expect_err("reissue should fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(err.message(), "Refresh token is expired or used");
        assert!(!err.message().contains(&ghost.to_string()));
    }
}
