pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod subscription_dao;
pub mod user_dao;
pub mod video_dao;

pub use base::DaoBase;
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use subscription_dao::SubscriptionDao;
pub use user_dao::{NewUserRecord, UserDao, UserPatch};
pub use video_dao::{NewVideoRecord, VideoDao};
