use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue::Set};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum SongStatus {
    #[sea_orm(string_value = "Practice")]
    Practice,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "OnHold")]
    OnHold,
}

impl SongStatus {
    pub const ALL: [SongStatus; 3] = [Self::Practice, Self::Completed, Self::OnHold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Practice => "Practice",
            Self::Completed => "Completed",
            Self::OnHold => "OnHold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "songs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub status: SongStatus,
    pub lyrics: Option<String>,
    pub chords: Option<String>,
    pub link: Option<String>,
    pub memo: Option<String>,
    pub genre: Option<String>,
    /// 1 (easy) to 5 (hard)
    pub difficulty: i32,
    /// Storage key of the most recently uploaded sheet
    pub sheet_music: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[sea_orm(has_many)]
    pub media: HasMany<super::media::Entity>,
    #[sea_orm(has_many)]
    pub practice_logs: HasMany<super::practice_log::Entity>,
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            status: Set(SongStatus::Practice),
            difficulty: Set(3),
            created_at: Set(now),
            updated_at: Set(now),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, sea_orm::DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();

        if insert {
            self.created_at = Set(now);
        }

        self.updated_at = Set(now);

        Ok(self)
    }
}
