use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{subscription, user, video};

/// The only shape a user leaves the persistence layer in: no password digest,
/// no refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub watch_history: Vec<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<user::Model> for PublicUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            avatar: model.avatar,
            cover_image: model.cover_image,
            watch_history: model.watch_history.0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub subscriber: Uuid,
    pub channel: Uuid,
    pub created_at: DateTime<FixedOffset>,
}

impl From<subscription::Model> for SubscriptionRecord {
    fn from(model: subscription::Model) -> Self {
        Self {
            id: model.id,
            subscriber: model.subscriber_id,
            channel: model.channel_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: i32,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<video::Model> for VideoRecord {
    fn from(model: video::Model) -> Self {
        Self {
            id: model.id,
            owner: model.owner_id,
            title: model.title,
            description: model.description,
            video_file: model.video_file,
            thumbnail: model.thumbnail,
            duration: model.duration_secs,
            views: model.views,
            is_published: model.is_published,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::PublicUser;
    use crate::db::entities::user::{self, WatchHistory};

    #[test]
    fn public_user_never_serializes_secrets() {
        let now = Utc::now().fixed_offset();
        let video = Uuid::new_v4();
        let model = user::Model {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice".to_string(),
            avatar: "/media/a.png".to_string(),
            cover_image: None,
            password_hash: "argon-digest".to_string(),
            refresh_token: Some("refresh".to_string()),
            watch_history: WatchHistory(vec![video, video]),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(PublicUser::from(model)).expect("user should serialize");
        let text = json.to_string();
        assert!(!text.contains("argon-digest"));
        assert!(!text.contains("refresh"));
        assert!(json.get("password").is_none());
        assert_eq!(json["fullName"], "Alice");
        assert!(json["coverImage"].is_null());
        assert_eq!(json["watchHistory"].as_array().map(Vec::len), Some(2));
    }
}
