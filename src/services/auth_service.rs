use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{TokenPair, TokenService},
    db::projections::PublicUser,
    error::AppError,
    media::{MediaStore, StagedFile, upload_staged},
    services::user_service::{Registration, UserService},
};

/// Multipart registration input with the uploads still staged on disk.
#[derive(Debug, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub avatar: Option<StagedFile>,
    pub cover_image: Option<StagedFile>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub user: PublicUser,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Session lifecycle: registration, login, logout and refresh rotation.
#[derive(Clone, Copy)]
pub struct AuthService<'a> {
    users: &'a UserService,
    tokens: &'a TokenService,
    media: &'a dyn MediaStore,
}

impl<'a> AuthService<'a> {
    pub fn new(users: &'a UserService, tokens: &'a TokenService, media: &'a dyn MediaStore) -> Self {
        Self {
            users,
            tokens,
            media,
        }
    }

    /// Field checks and the availability check run before any upload, so a
    /// rejected registration never publishes media. Staged files are dropped
    /// (and removed) on every path.
    pub async fn register(&self, form: RegistrationForm) -> Result<PublicUser, AppError> {
        let RegistrationForm {
            username,
            email,
            password,
            full_name,
            avatar,
            cover_image,
        } = form;

        UserService::validate_registration(&username, &email, &password, &full_name)?;
        self.users
            .ensure_available(&username.trim().to_lowercase(), email.trim())
            .await?;

        let avatar = avatar.ok_or_else(|| AppError::validation("Avatar file is required"))?;
        let avatar = upload_staged(self.media, avatar).await;
        let cover_image = match cover_image {
            Some(file) => upload_staged(self.media, file).await,
            None => None,
        };
        let avatar = avatar.ok_or_else(|| AppError::validation("Avatar file is required"))?;

        self.users
            .create(Registration {
                username,
                email,
                password,
                full_name,
                avatar: avatar.url,
                cover_image: cover_image.map(|stored| stored.url),
            })
            .await
    }

    pub async fn login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<LoginOutcome, AppError> {
        let has_identifier = [username, email]
            .iter()
            .flatten()
            .any(|value| !value.trim().is_empty());
        if !has_identifier {
            return Err(AppError::validation("Username or email is required"));
        }

        let user = self.users.authenticate(username, email, password).await?;
        let tokens = self.tokens.issue_pair(&user.id).await?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome { user, tokens })
    }

    pub async fn logout(&self, user_id: &Uuid) -> Result<(), AppError> {
        self.tokens.revoke(user_id).await?;
        tracing::info!(user_id = %user_id, "user logged out");
        Ok(())
    }

    pub async fn refresh(&self, incoming: Option<&str>) -> Result<TokenPair, AppError> {
        let incoming = incoming
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;
        self.tokens.rotate(incoming).await
    }
}
