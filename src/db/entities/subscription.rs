use sea_orm::entity::prelude::*;

use crate::db::dao::base_traits::timestamped_entity;

/// Directed edge "subscriber follows channel". Both ends are plain user ids
/// without foreign keys, so removing a user leaves its edges in place.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub subscriber_id: Uuid,
    #[sea_orm(indexed)]
    pub channel_id: Uuid,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}

timestamped_entity!();
