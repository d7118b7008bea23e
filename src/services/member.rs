use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::error::{AppError, AppResult};
use crate::uploads::{UploadDir, UploadStore};

pub const MEMBER_NOT_FOUND: &str = "Member not found";

#[derive(Debug, Default, Clone)]
pub struct MemberChanges {
    pub name: Option<String>,
    pub instrument: Option<String>,
}

pub struct MemberService {
    db: Arc<Database>,
    uploads: Arc<UploadStore>,
}

impl MemberService {
    pub fn new(db: Arc<Database>, uploads: Arc<UploadStore>) -> Self {
        Self { db, uploads }
    }

    pub async fn list(&self) -> AppResult<Vec<entities::member::Model>> {
        let members = entities::member::Entity::find()
            .order_by_asc(entities::member::Column::Id)
            .all(&self.db.conn)
            .await?;
        Ok(members)
    }

    pub async fn get(&self, id: i64) -> AppResult<entities::member::Model> {
        entities::member::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| AppError::not_found(MEMBER_NOT_FOUND))
    }

    pub async fn create(
        &self,
        name: String,
        instrument: String,
    ) -> AppResult<entities::member::Model> {
        let member = entities::member::ActiveModel {
            name: Set(name),
            instrument: Set(instrument),
            ..Default::default()
        };

        let model = member.insert(&self.db.conn).await?;
        log::info!("Member created: '{}' (ID: {})", model.name, model.id);
        Ok(model)
    }

    pub async fn update(
        &self,
        id: i64,
        changes: MemberChanges,
    ) -> AppResult<entities::member::Model> {
        let member = self.get(id).await?;
        if changes.name.is_none() && changes.instrument.is_none() {
            return Ok(member);
        }

        let mut active: entities::member::ActiveModel = member.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(instrument) = changes.instrument {
            active.instrument = Set(instrument);
        }

        let model = active.update(&self.db.conn).await?;
        log::info!("Member updated: '{}' (ID: {})", model.name, model.id);
        Ok(model)
    }

    /// Delete a member along with its personal logs, then their files.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let files = self
            .db
            .conn
            .transaction::<_, Vec<String>, AppError>(|txn| {
                Box::pin(async move {
                    entities::member::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| AppError::not_found(MEMBER_NOT_FOUND))?;

                    let logs = entities::personal_log::Entity::find()
                        .filter(entities::personal_log::Column::MemberId.eq(id))
                        .all(txn)
                        .await?;

                    entities::personal_log::Entity::delete_many()
                        .filter(entities::personal_log::Column::MemberId.eq(id))
                        .exec(txn)
                        .await?;
                    entities::member::Entity::delete_by_id(id).exec(txn).await?;

                    Ok(logs.into_iter().map(|log| log.filename).collect())
                })
            })
            .await?;

        for file in &files {
            self.uploads.remove(UploadDir::PersonalLogs, file).await;
        }

        log::info!("Member deleted (ID: {}), removed {} log file(s)", id, files.len());
        Ok(())
    }
}
