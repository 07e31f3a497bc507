use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::video::{self, Entity as Video};

#[derive(Clone)]
pub struct VideoDao {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct NewVideoRecord {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration_secs: i32,
}

impl DaoBase for VideoDao {
    type Entity = Video;
    const ENTITY_NAME: &'static str = "video";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl VideoDao {
    pub async fn create_video(&self, record: NewVideoRecord) -> DaoResult<video::Model> {
        let model = video::ActiveModel {
            owner_id: Set(record.owner_id),
            title: Set(record.title),
            description: Set(record.description),
            video_file: Set(record.video_file),
            thumbnail: Set(record.thumbnail),
            duration_secs: Set(record.duration_secs),
            views: Set(0),
            is_published: Set(true),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn find_by_ids(&self, ids: Vec<Uuid>) -> DaoResult<Vec<video::Model>> {
        self.find_all(move |query| query.filter(video::Column::Id.is_in(ids)))
            .await
    }
}
