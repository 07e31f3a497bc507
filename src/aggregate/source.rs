use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Collection, CollectionSource, Document, Filter, to_document};
use crate::{
    db::{
        dao::DaoContext,
        projections::{PublicUser, SubscriptionRecord, VideoRecord},
    },
    error::AppError,
};

/// Production source: each fetch is a single `IN (...)` query through the DAOs.
#[async_trait]
impl CollectionSource for DaoContext {
    async fn fetch(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, AppError> {
        let (field, values) = match filter {
            Filter::Eq { field, value } => (field.as_str(), std::slice::from_ref(value)),
            Filter::In { field, values } => (field.as_str(), values.as_slice()),
        };

        match (collection, field) {
            (Collection::Users, "id") => {
                let rows = self.user().find_by_ids(uuids(values)).await?;
                documents(rows.into_iter().map(PublicUser::from))
            }
            (Collection::Users, "username") => {
                let rows = self.user().find_by_usernames(strings(values)).await?;
                documents(rows.into_iter().map(PublicUser::from))
            }
            (Collection::Subscriptions, "channel") => {
                let rows = self.subscription().find_by_channels(uuids(values)).await?;
                documents(rows.into_iter().map(SubscriptionRecord::from))
            }
            (Collection::Subscriptions, "subscriber") => {
                let rows = self
                    .subscription()
                    .find_by_subscribers(uuids(values))
                    .await?;
                documents(rows.into_iter().map(SubscriptionRecord::from))
            }
            (Collection::Videos, "id") => {
                let rows = self.video().find_by_ids(uuids(values)).await?;
                documents(rows.into_iter().map(VideoRecord::from))
            }
            (collection, field) => Err(AppError::internal(format!(
                "no index for {}.{}",
                collection.as_str(),
                field
            ))),
        }
    }
}

fn documents<T: serde::Serialize>(records: impl Iterator<Item = T>) -> Result<Vec<Document>, AppError> {
    records.map(|record| to_document(&record)).collect()
}

/// Values that are not uuid strings cannot match a uuid column and are skipped.
fn uuids(values: &[Value]) -> Vec<Uuid> {
    values
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|raw| Uuid::parse_str(raw).ok())
        .collect()
}

fn strings(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
