use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::database::Database;
use crate::entities;
use crate::error::{AppError, AppResult};
use crate::services::song::SONG_NOT_FOUND;
use crate::uploads::{self, UploadDir, UploadStore, UploadedFile};

pub const PRACTICE_LOG_NOT_FOUND: &str = "Practice log not found";

#[derive(Debug, Default, Clone)]
pub struct NewPracticeLog {
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
    pub content: Option<String>,
    pub feedback: Option<String>,
}

/// Partial update, `Some(None)` clears a text field.
#[derive(Debug, Default, Clone)]
pub struct PracticeLogChanges {
    pub date: Option<DateTime<Utc>>,
    pub content: Option<Option<String>>,
    pub feedback: Option<Option<String>>,
}

pub struct PracticeLogService {
    db: Arc<Database>,
    uploads: Arc<UploadStore>,
}

impl PracticeLogService {
    pub fn new(db: Arc<Database>, uploads: Arc<UploadStore>) -> Self {
        Self { db, uploads }
    }

    async fn ensure_song(&self, song_id: i64) -> AppResult<()> {
        entities::song::Entity::find_by_id(song_id)
            .one(&self.db.conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(SONG_NOT_FOUND))
    }

    /// Logs of one song, most recent practice first.
    pub async fn list_for_song(
        &self,
        song_id: i64,
    ) -> AppResult<Vec<entities::practice_log::Model>> {
        self.ensure_song(song_id).await?;

        let logs = entities::practice_log::Entity::find()
            .filter(entities::practice_log::Column::SongId.eq(song_id))
            .order_by_desc(entities::practice_log::Column::Date)
            .order_by_desc(entities::practice_log::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(logs)
    }

    pub async fn get(&self, id: i64) -> AppResult<entities::practice_log::Model> {
        entities::practice_log::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| AppError::not_found(PRACTICE_LOG_NOT_FOUND))
    }

    pub async fn create(
        &self,
        song_id: i64,
        new_log: NewPracticeLog,
    ) -> AppResult<entities::practice_log::Model> {
        self.ensure_song(song_id).await?;

        let mut log = entities::practice_log::ActiveModel {
            song_id: Set(song_id),
            content: Set(new_log.content),
            feedback: Set(new_log.feedback),
            ..Default::default()
        };
        if let Some(date) = new_log.date {
            log.date = Set(date);
        }

        let model = log.insert(&self.db.conn).await?;
        log::info!("Practice log created for song {} (ID: {})", song_id, model.id);
        Ok(model)
    }

    pub async fn update(
        &self,
        id: i64,
        changes: PracticeLogChanges,
    ) -> AppResult<entities::practice_log::Model> {
        let log = self.get(id).await?;
        let mut active: entities::practice_log::ActiveModel = log.into();

        if let Some(date) = changes.date {
            active.date = Set(date);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }
        if let Some(feedback) = changes.feedback {
            active.feedback = Set(feedback);
        }

        let model = active.update(&self.db.conn).await?;
        log::info!("Practice log updated (ID: {})", model.id);
        Ok(model)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let log = self.get(id).await?;
        entities::practice_log::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await?;

        if let Some(recording) = log.recording {
            self.uploads.remove(UploadDir::Root, &recording).await;
        }

        log::info!("Practice log deleted (ID: {})", id);
        Ok(())
    }

    /// Store a recording for the log, replacing any previous one.
    pub async fn attach_recording(
        &self,
        id: i64,
        file: Option<UploadedFile>,
    ) -> AppResult<entities::practice_log::Model> {
        let log = self.get(id).await?;
        let file = uploads::require_file(file)?;
        uploads::check_song_media_extension(&file.filename)?;

        let filename = format!(
            "practice_{}_{}_{}",
            id,
            Utc::now().timestamp(),
            uploads::sanitize_filename(&file.filename)
        );
        self.uploads
            .save(UploadDir::Root, &filename, &file.bytes)
            .await?;

        let previous = log.recording.clone();
        let mut active: entities::practice_log::ActiveModel = log.into();
        active.recording = Set(Some(filename.clone()));

        let model = match active.update(&self.db.conn).await {
            Ok(model) => model,
            Err(e) => {
                self.uploads.remove(UploadDir::Root, &filename).await;
                return Err(e.into());
            }
        };

        if let Some(previous) = previous.filter(|p| *p != filename) {
            self.uploads.remove(UploadDir::Root, &previous).await;
        }

        log::info!("Recording attached to practice log {}: {}", id, filename);
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestContext, new_song};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.practice_log_service();

        for day in [3, 10, 7] {
            service
                .create(
                    song.id,
                    NewPracticeLog {
                        date: Some(Utc.with_ymd_and_hms(2024, 5, day, 19, 0, 0).unwrap()),
                        content: Some(format!("day {day}")),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let logs = service.list_for_song(song.id).await.unwrap();
        let contents: Vec<_> = logs.iter().filter_map(|l| l.content.as_deref()).collect();
        assert_eq!(contents, ["day 10", "day 7", "day 3"]);
    }

    #[tokio::test]
    async fn test_missing_parents_are_not_found() {
        let ctx = TestContext::new().await;
        let service = ctx.practice_log_service();

        let err = service.create(42, NewPracticeLog::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Song not found");
        assert!(matches!(
            service.list_for_song(42).await,
            Err(AppError::NotFound(_))
        ));
        let err = service.get(42).await.unwrap_err();
        assert_eq!(err.to_string(), PRACTICE_LOG_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_replaces_only_given_fields() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.practice_log_service();
        let log = service
            .create(
                song.id,
                NewPracticeLog {
                    content: Some("intro".into()),
                    feedback: Some("rushed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                log.id,
                PracticeLogChanges {
                    feedback: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content.as_deref(), Some("intro"));
        assert_eq!(updated.feedback, None);
        assert_eq!(updated.date, log.date);
    }

    #[tokio::test]
    async fn test_recording_is_replaced_and_removed() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.practice_log_service();
        let log = service.create(song.id, Default::default()).await.unwrap();

        let first = service
            .attach_recording(log.id, Some(ctx.file("Take 1.m4a", b"one")))
            .await
            .unwrap()
            .recording
            .unwrap();
        assert!(first.starts_with(&format!("practice_{}_", log.id)));
        assert!(first.ends_with("_Take_1.m4a"));

        let err = service
            .attach_recording(log.id, Some(ctx.file("run.exe", b"MZ")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(service.get(log.id).await.unwrap().recording, Some(first.clone()));

        let second = service
            .attach_recording(log.id, Some(ctx.file("Take 2.m4a", b"two")))
            .await
            .unwrap()
            .recording
            .unwrap();
        assert!(!ctx.uploads.exists(UploadDir::Root, &first).await);
        assert!(ctx.uploads.exists(UploadDir::Root, &second).await);

        service.delete(log.id).await.unwrap();
        assert!(!ctx.uploads.exists(UploadDir::Root, &second).await);
        assert_eq!(ctx.uploaded_file_count(), 0);
    }
}
