use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    aggregate::{CollectionSource, Document, plans},
    db::dao::DaoContext,
    error::AppError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub full_name: String,
    pub username: String,
    pub subscribers_count: u64,
    pub channels_subscribed_to_count: u64,
    pub is_subscribed: bool,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub full_name: String,
    pub username: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedVideo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: i32,
    pub views: i64,
    pub is_published: bool,
    pub owner: Option<OwnerSummary>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRow {
    watch_history: Vec<WatchedVideo>,
}

/// Read-only views computed by the aggregation plans.
#[derive(Clone)]
pub struct ChannelService {
    source: DaoContext,
}

impl ChannelService {
    pub fn new(source: DaoContext) -> Self {
        Self { source }
    }

    pub async fn channel_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
    ) -> Result<ChannelProfile, AppError> {
        channel_profile_from(&self.source, username, viewer).await
    }

    pub async fn watch_history(&self, user_id: &Uuid) -> Result<Vec<WatchedVideo>, AppError> {
        watch_history_from(&self.source, user_id).await
    }
}

pub(crate) async fn channel_profile_from(
    source: &dyn CollectionSource,
    username: &str,
    viewer: Option<Uuid>,
) -> Result<ChannelProfile, AppError> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::validation("Username is missing"));
    }

    let row = plans::channel_profile(&username, viewer)
        .run(source)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Channel does not exist"))?;
    decode(row)
}

pub(crate) async fn watch_history_from(
    source: &dyn CollectionSource,
    user_id: &Uuid,
) -> Result<Vec<WatchedVideo>, AppError> {
    let row = plans::watch_history(*user_id)
        .run(source)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(decode::<HistoryRow>(row)?.watch_history)
}

fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, AppError> {
    serde_json::from_value(serde_json::Value::Object(doc)).map_err(|err| {
        tracing::error!(error = %err, "aggregation result has an unexpected shape");
        AppError::internal("Failed to read aggregation result")
    })
}
