use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue::Set};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "song_suggestions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub link: String,
    pub thumbs_up: i32,
    pub thumbs_down: i32,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn score(&self) -> i32 {
        self.thumbs_up - self.thumbs_down
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            thumbs_up: Set(0),
            thumbs_down: Set(0),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}
