use serde_json::{Value, json};
use uuid::Uuid;

use super::{Collection, Expr, Pipeline, Stage};

pub const CHANNEL_PROFILE_FIELDS: [&str; 8] = [
    "fullName",
    "username",
    "subscribersCount",
    "channelsSubscribedToCount",
    "isSubscribed",
    "avatar",
    "coverImage",
    "email",
];

pub const OWNER_FIELDS: [&str; 3] = ["fullName", "username", "avatar"];

/// Channel header: edge counts in both directions and whether `viewer`
/// follows the channel. `username` is expected already normalized.
pub fn channel_profile(username: &str, viewer: Option<Uuid>) -> Pipeline {
    Pipeline::new(
        Collection::Users,
        vec![
            Stage::matching("username", json!(username)),
            Stage::lookup(Collection::Subscriptions, "id", "channel", "subscribers"),
            Stage::lookup(Collection::Subscriptions, "id", "subscriber", "subscribedTo"),
            Stage::derive("subscribersCount", Expr::Size("subscribers".into())),
            Stage::derive("channelsSubscribedToCount", Expr::Size("subscribedTo".into())),
            Stage::derive(
                "isSubscribed",
                Expr::Contains {
                    path: "subscribers.subscriber".into(),
                    value: viewer.map(|id| Value::String(id.to_string())),
                },
            ),
            Stage::project(CHANNEL_PROFILE_FIELDS),
        ],
    )
}

/// The user's history expanded into videos, each carrying a trimmed owner
/// object (null when the owner no longer exists).
pub fn watch_history(user_id: Uuid) -> Pipeline {
    Pipeline::new(
        Collection::Users,
        vec![
            Stage::matching("id", Value::String(user_id.to_string())),
            Stage::lookup(Collection::Videos, "watchHistory", "id", "watchHistory").with_pipeline(
                vec![
                    Stage::lookup(Collection::Users, "owner", "id", "owner")
                        .with_pipeline(vec![Stage::project(OWNER_FIELDS)]),
                    Stage::derive("owner", Expr::First("owner".into())),
                ],
            ),
            Stage::project(["watchHistory"]),
        ],
    )
}
