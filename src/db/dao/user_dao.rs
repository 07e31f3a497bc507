use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::Expr,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::user::{self, Entity as User, WatchHistory};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

/// Column values for a brand-new account; the caller has already hashed the password.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

impl DaoBase for UserDao {
    type Entity = User;
    const ENTITY_NAME: &'static str = "user";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    /// First user whose username or email matches; either side may be absent.
    pub async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> DaoResult<Option<user::Model>> {
        let condition = match (username, email) {
            (None, None) => return Ok(None),
            (Some(username), None) => {
                Condition::any().add(user::Column::Username.eq(username.to_string()))
            }
            (None, Some(email)) => Condition::any().add(user::Column::Email.eq(email.to_string())),
            (Some(username), Some(email)) => Condition::any()
                .add(user::Column::Username.eq(username.to_string()))
                .add(user::Column::Email.eq(email.to_string())),
        };

        self.find_one(move |query| query.filter(condition)).await
    }

    pub async fn find_by_ids(&self, ids: Vec<Uuid>) -> DaoResult<Vec<user::Model>> {
        self.find_all(move |query| query.filter(user::Column::Id.is_in(ids)))
            .await
    }

    pub async fn find_by_usernames(&self, usernames: Vec<String>) -> DaoResult<Vec<user::Model>> {
        self.find_all(move |query| query.filter(user::Column::Username.is_in(usernames)))
            .await
    }

    pub async fn create_user(&self, record: NewUserRecord) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            username: Set(record.username),
            email: Set(record.email),
            full_name: Set(record.full_name),
            avatar: Set(record.avatar),
            cover_image: Set(record.cover_image),
            password_hash: Set(record.password_hash),
            refresh_token: Set(None),
            watch_history: Set(WatchHistory::default()),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Single-column overwrite. The row is not loaded, so nothing else is rewritten.
    pub async fn set_refresh_token(&self, id: &Uuid, token: Option<&str>) -> DaoResult<()> {
        let result = User::update_many()
            .col_expr(
                user::Column::RefreshToken,
                Expr::value(token.map(str::to_string)),
            )
            .filter(user::Column::Id.eq(*id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound {
                entity: Self::ENTITY_NAME,
                id: *id,
            });
        }
        Ok(())
    }

    pub async fn update_profile(&self, id: &Uuid, patch: UserPatch) -> DaoResult<user::Model> {
        self.update(*id, move |active| {
            if let Some(full_name) = patch.full_name {
                active.full_name = Set(full_name);
            }
            if let Some(email) = patch.email {
                active.email = Set(email);
            }
            if let Some(avatar) = patch.avatar {
                active.avatar = Set(avatar);
            }
            if let Some(cover_image) = patch.cover_image {
                active.cover_image = Set(Some(cover_image));
            }
        })
        .await
    }

    pub async fn set_password_hash(&self, id: &Uuid, password_hash: &str) -> DaoResult<()> {
        let password_hash = password_hash.to_string();
        self.update(*id, move |active| {
            active.password_hash = Set(password_hash);
        })
        .await
        .map(|_| ())
    }

    pub async fn append_watch_history(&self, id: &Uuid, video_id: &Uuid) -> DaoResult<user::Model> {
        let current = self.find_by_id(*id).await?;
        let mut history = current.watch_history;
        history.0.push(*video_id);
        self.update(*id, move |active| {
            active.watch_history = Set(history);
        })
        .await
    }
}
