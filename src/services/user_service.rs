use uuid::Uuid;

use crate::{
    auth::password::{hash_password, verify_password},
    db::{
        dao::{DaoBase, DaoLayerError, NewUserRecord, UserDao, UserPatch},
        entities::user,
        projections::PublicUser,
    },
    error::AppError,
    media::{MediaStore, StagedFile, upload_staged},
};

/// Raw registration input; trimming and normalization happen in `create`.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
}

/// The credential store. Everything leaving it is a `PublicUser`; the full
/// row is only handed to the token service through `find_record`.
#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
}

impl UserService {
    pub fn new(user_dao: UserDao) -> Self {
        Self { user_dao }
    }

    pub(crate) async fn find_record(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_optional(*id).await?)
    }

    pub async fn find_public(&self, id: &Uuid) -> Result<Option<PublicUser>, AppError> {
        Ok(self.find_record(id).await?.map(PublicUser::from))
    }

    /// Username matches case-insensitively, email exactly after trimming.
    pub async fn find_by_identifier(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<PublicUser>, AppError> {
        Ok(self
            .lookup(username, email)
            .await?
            .map(PublicUser::from))
    }

    async fn lookup(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<user::Model>, AppError> {
        let username = username
            .map(normalize_username)
            .filter(|value| !value.is_empty());
        let email = email.map(str::trim).filter(|value| !value.is_empty());

        Ok(self
            .user_dao
            .find_by_username_or_email(username.as_deref(), email)
            .await?)
    }

    /// Checks the fields registration cannot proceed without.
    pub fn validate_registration(
        username: &str,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), AppError> {
        if [username, email, password, full_name]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(AppError::validation("All fields are required"));
        }
        Ok(())
    }

    pub async fn ensure_available(&self, username: &str, email: &str) -> Result<(), AppError> {
        if self.lookup(Some(username), Some(email)).await?.is_some() {
            return Err(AppError::conflict(
                "User with email or username already exists",
            ));
        }
        Ok(())
    }

    pub async fn create(&self, registration: Registration) -> Result<PublicUser, AppError> {
        Self::validate_registration(
            &registration.username,
            &registration.email,
            &registration.password,
            &registration.full_name,
        )?;

        let username = normalize_username(&registration.username);
        let email = registration.email.trim().to_string();
        self.ensure_available(&username, &email).await?;

        let password_hash = hash_password(&registration.password)?;
        let created = self
            .user_dao
            .create_user(NewUserRecord {
                username,
                email,
                full_name: registration.full_name.trim().to_string(),
                avatar: registration.avatar,
                cover_image: registration.cover_image,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                DaoLayerError::Duplicate { .. } => {
                    AppError::conflict("User with email or username already exists")
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = %created.id, username = %created.username, "user registered");
        Ok(created.into())
    }

    /// Resolves the identifier and checks the password. The stored record is
    /// never touched by a failed attempt.
    pub async fn authenticate(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<PublicUser, AppError> {
        let user = self
            .lookup(username, email)
            .await?
            .ok_or_else(|| AppError::not_found("User does not exist"))?;

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::unauthorized("Invalid user credentials"));
        }
        Ok(user.into())
    }

    pub async fn verify_password(&self, id: &Uuid, plaintext: &str) -> Result<bool, AppError> {
        let user = self.user_dao.find_by_id(*id).await?;
        verify_password(plaintext, &user.password_hash)
    }

    pub async fn set_refresh_token(&self, id: &Uuid, token: Option<&str>) -> Result<(), AppError> {
        Ok(self.user_dao.set_refresh_token(id, token).await?)
    }

    pub async fn update_profile(&self, id: &Uuid, patch: UserPatch) -> Result<PublicUser, AppError> {
        let updated = self
            .user_dao
            .update_profile(id, patch)
            .await
            .map_err(|err| match err {
                DaoLayerError::Duplicate { .. } => AppError::conflict("Email is already in use"),
                other => other.into(),
            })?;
        Ok(updated.into())
    }

    pub async fn update_account_details(
        &self,
        id: &Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<PublicUser, AppError> {
        let full_name = full_name.trim();
        let email = email.trim();
        if full_name.is_empty() || email.is_empty() {
            return Err(AppError::validation("All fields are required"));
        }

        self.update_profile(
            id,
            UserPatch {
                full_name: Some(full_name.to_string()),
                email: Some(email.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn update_avatar(
        &self,
        id: &Uuid,
        file: Option<StagedFile>,
        media: &dyn MediaStore,
    ) -> Result<PublicUser, AppError> {
        let file = file.ok_or_else(|| AppError::validation("Avatar file is missing"))?;
        let stored = upload_staged(media, file)
            .await
            .ok_or_else(|| AppError::validation("Error while uploading avatar"))?;

        self.update_profile(
            id,
            UserPatch {
                avatar: Some(stored.url),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn update_cover_image(
        &self,
        id: &Uuid,
        file: Option<StagedFile>,
        media: &dyn MediaStore,
    ) -> Result<PublicUser, AppError> {
        let file = file.ok_or_else(|| AppError::validation("Cover image file is missing"))?;
        let stored = upload_staged(media, file)
            .await
            .ok_or_else(|| AppError::validation("Error while uploading cover image"))?;

        self.update_profile(
            id,
            UserPatch {
                cover_image: Some(stored.url),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn change_password(
        &self,
        id: &Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if !self.verify_password(id, old_password).await? {
            return Err(AppError::validation("Invalid old password"));
        }

        let password_hash = hash_password(new_password)?;
        self.user_dao.set_password_hash(id, &password_hash).await?;
        tracing::info!(user_id = %id, "password changed");
        Ok(())
    }

    pub async fn record_view(&self, id: &Uuid, video_id: &Uuid) -> Result<PublicUser, AppError> {
        Ok(self.user_dao.append_watch_history(id, video_id).await?.into())
    }
}

fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{Registration, UserService};
    use crate::{
        db::dao::{DaoBase, UserDao},
        error::AppError,
        test_helpers::sqlite_db,
    };

    fn registration(username: &str, email: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: "correct-horse".to_string(),
            full_name: "Test User".to_string(),
            avatar: "/media/avatar.png".to_string(),
            cover_image: None,
        }
    }

    async fn service() -> (UserService, UserDao) {
        let db = sqlite_db().await;
        let dao = UserDao::new(&db);
        (UserService::new(dao.clone()), dao)
    }

    #[tokio::test]
    async fn create_normalizes_and_hashes() {
        let (users, dao) = service().await;

        let created = users
            .create(registration("  Alice ", "alice@example.com"))
            .await
            .expect("registration should succeed");
        assert_eq!(created.username, "alice");

        let stored = dao.find_by_id(created.id).await.expect("row should exist");
        assert_ne!(stored.password_hash, "correct-horse");
        assert!(stored.refresh_token.is_none());
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let (users, _) = service().await;
        users
            .create(registration("alice", "alice@example.com"))
            .await
            .expect("first registration should succeed");

        let same_email = users
            .create(registration("alice2", "alice@example.com"))
            .await
            .expect_err("same email should conflict");
        assert!(matches!(same_email, AppError::Conflict(_)));

        let same_username = users
            .create(registration("ALICE", "other@example.com"))
            .await
            .expect_err("same username should conflict");
        assert!(matches!(same_username, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn blank_fields_fail_validation() {
        let (users, _) = service().await;
        let mut input = registration("bob", "bob@example.com");
        input.full_name = "   ".to_string();

        let err = users.create(input).await.expect_err("blank name should fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive_for_usernames_only() {
        let (users, _) = service().await;
        users
            .create(registration("carol", "Carol@Example.com"))
            .await
            .expect("registration should succeed");

        assert!(
            users
                .find_by_identifier(Some("CAROL"), None)
                .await
                .expect("lookup should run")
                .is_some()
        );
        assert!(
            users
                .find_by_identifier(None, Some(" Carol@Example.com "))
                .await
                .expect("lookup should run")
                .is_some()
        );
        assert!(
            users
                .find_by_identifier(None, Some("carol@example.com"))
                .await
                .expect("lookup should run")
                .is_none()
        );
    }

    #[tokio::test]
    async fn authenticate_distinguishes_missing_user_and_bad_password() {
        let (users, dao) = service().await;
        let created = users
            .create(registration("dave", "dave@example.com"))
            .await
            .expect("registration should succeed");
        let before = dao.find_by_id(created.id).await.expect("row should exist");

        let missing = users
            .authenticate(Some("nobody"), None, "correct-horse")
            .await
            .expect_err("unknown user should fail");
        assert!(matches!(missing, AppError::NotFound(_)));

        for _ in 0..3 {
            let wrong = users
                .authenticate(Some("dave"), None, "wrong")
                .await
                .expect_err("wrong password should fail");
            assert!(matches!(wrong, AppError::Unauthorized(_)));
        }
        let after = dao.find_by_id(created.id).await.expect("row should exist");
        assert_eq!(before, after);

        let ok = users
            .authenticate(None, Some("dave@example.com"), "correct-horse")
            .await
            .expect("right password should pass");
        assert_eq!(ok.id, created.id);
    }

    #[tokio::test]
    async fn change_password_requires_the_old_one() {
        let (users, _) = service().await;
        let created = users
            .create(registration("erin", "erin@example.com"))
            .await
            .expect("registration should succeed");

        let err = users
            .change_password(&created.id, "nope", "new-secret")
            .await
            .expect_err("wrong old password should fail");
        assert_eq!(err.message(), "Invalid old password");

        users
            .change_password(&created.id, "correct-horse", "new-secret")
            .await
            .expect("change should succeed");
        assert!(
            users
                .verify_password(&created.id, "new-secret")
                .await
                .expect("verify should run")
        );
    }

    #[tokio::test]
    async fn account_details_update_rejects_taken_email() {
        let (users, _) = service().await;
        users
            .create(registration("frank", "frank@example.com"))
            .await
            .expect("registration should succeed");
        let grace = users
            .create(registration("grace", "grace@example.com"))
            .await
            .expect("registration should succeed");

        let err = users
            .update_account_details(&grace.id, "Grace", "frank@example.com")
            .await
            .expect_err("taken email should conflict");
        assert!(matches!(err, AppError::Conflict(_)));

        let updated = users
            .update_account_details(&grace.id, "Grace Hopper", "gh@example.com")
            .await
            .expect("update should succeed");
        assert_eq!(updated.full_name, "Grace Hopper");
        assert_eq!(updated.email, "gh@example.com");
    }

    #[tokio::test]
    async fn record_view_appends_with_duplicates() {
        let (users, _) = service().await;
        let created = users
            .create(registration("heidi", "heidi@example.com"))
            .await
            .expect("registration should succeed");
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        for video in [a, b, a] {
            users
                .record_view(&created.id, &video)
                .await
                .expect("append should succeed");
        }
        let public = users
            .find_public(&created.id)
            .await
            .expect("lookup should run")
            .expect("user should exist");
        assert_eq!(public.watch_history, vec![a, b, a]);
    }
}
