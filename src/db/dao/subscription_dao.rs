use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::subscription::{self, Entity as Subscription};

#[derive(Clone)]
pub struct SubscriptionDao {
    db: DatabaseConnection,
}

impl DaoBase for SubscriptionDao {
    type Entity = Subscription;
    const ENTITY_NAME: &'static str = "subscription";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl SubscriptionDao {
    pub async fn create_edge(
        &self,
        subscriber_id: &Uuid,
        channel_id: &Uuid,
    ) -> DaoResult<subscription::Model> {
        let model = subscription::ActiveModel {
            subscriber_id: Set(*subscriber_id),
            channel_id: Set(*channel_id),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Removes every edge between the pair and returns how many went away.
    pub async fn delete_edge(&self, subscriber_id: &Uuid, channel_id: &Uuid) -> DaoResult<u64> {
        let result = Subscription::delete_many()
            .filter(subscription::Column::SubscriberId.eq(*subscriber_id))
            .filter(subscription::Column::ChannelId.eq(*channel_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    pub async fn find_by_channels(&self, channel_ids: Vec<Uuid>) -> DaoResult<Vec<subscription::Model>> {
        self.find_all(move |query| query.filter(subscription::Column::ChannelId.is_in(channel_ids)))
            .await
    }

    pub async fn find_by_subscribers(
        &self,
        subscriber_ids: Vec<Uuid>,
    ) -> DaoResult<Vec<subscription::Model>> {
        self.find_all(move |query| {
            query.filter(subscription::Column::SubscriberId.is_in(subscriber_ids))
        })
        .await
    }
}
