use sea_orm::DatabaseConnection;

use super::{DaoBase, SubscriptionDao, UserDao, VideoDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn subscription(&self) -> SubscriptionDao {
        DaoBase::new(&self.db)
    }

    pub fn video(&self) -> VideoDao {
        DaoBase::new(&self.db)
    }
}
