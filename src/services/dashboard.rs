use std::collections::BTreeMap;
use std::sync::Arc;

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};

use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::entities::song::SongStatus;
use crate::error::AppResult;

const RECENT_PRACTICE_LOGS: u64 = 5;

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_songs: u64,
    /// Only statuses that at least one song has
    pub status_counts: BTreeMap<String, u64>,
    pub total_practice_logs: u64,
    pub recent_practice_logs: Vec<entities::practice_log::Model>,
}

pub struct DashboardService {
    db: Arc<Database>,
}

impl DashboardService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let total_songs = entities::song::Entity::find().count(&self.db.conn).await?;

        let rows: Vec<(SongStatus, i64)> = entities::song::Entity::find()
            .select_only()
            .column(entities::song::Column::Status)
            .column_as(Expr::from(Func::count(Expr::col(entities::song::Column::Id))), "count")
            .group_by(entities::song::Column::Status)
            .into_tuple()
            .all(&self.db.conn)
            .await?;
        let status_counts = rows
            .into_iter()
            .map(|(status, count)| (status.as_str().to_string(), count as u64))
            .collect();

        let total_practice_logs = entities::practice_log::Entity::find()
            .count(&self.db.conn)
            .await?;

        let recent_practice_logs = entities::practice_log::Entity::find()
            .order_by_desc(entities::practice_log::Column::Date)
            .order_by_desc(entities::practice_log::Column::Id)
            .limit(RECENT_PRACTICE_LOGS)
            .all(&self.db.conn)
            .await?;

        Ok(DashboardStats {
            total_songs,
            status_counts,
            total_practice_logs,
            recent_practice_logs,
        })
    }
}
