use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::database::Database;
use crate::entities;
use crate::entities::personal_log::PersonalLogFileType;
use crate::error::{AppError, AppResult};
use crate::services::member::MEMBER_NOT_FOUND;
use crate::uploads::{self, MediaKind, UploadDir, UploadStore, UploadedFile};
use crate::validation;

pub const PERSONAL_LOG_NOT_FOUND: &str = "Personal log not found";

/// A member's own recordings, kept under `personal_logs/` in the upload root.
pub struct PersonalLogService {
    db: Arc<Database>,
    uploads: Arc<UploadStore>,
}

impl PersonalLogService {
    pub fn new(db: Arc<Database>, uploads: Arc<UploadStore>) -> Self {
        Self { db, uploads }
    }

    async fn ensure_member(&self, member_id: i64) -> AppResult<()> {
        entities::member::Entity::find_by_id(member_id)
            .one(&self.db.conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(MEMBER_NOT_FOUND))
    }

    pub async fn list_for_member(
        &self,
        member_id: i64,
    ) -> AppResult<Vec<entities::personal_log::Model>> {
        self.ensure_member(member_id).await?;

        let logs = entities::personal_log::Entity::find()
            .filter(entities::personal_log::Column::MemberId.eq(member_id))
            .order_by_desc(entities::personal_log::Column::CreatedAt)
            .order_by_desc(entities::personal_log::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(logs)
    }

    pub async fn create(
        &self,
        member_id: i64,
        title: Option<String>,
        file: Option<UploadedFile>,
    ) -> AppResult<entities::personal_log::Model> {
        self.ensure_member(member_id).await?;

        let title = validation::required_string(title.as_deref(), "title")?;
        validation::max_length(&title, "title", validation::TITLE_MAX_LEN)?;

        let file = uploads::require_file(file)?;
        uploads::check_personal_log_extension(&file.filename)?;

        let file_type = match uploads::media_kind(&file.filename) {
            MediaKind::Video => PersonalLogFileType::Video,
            _ => PersonalLogFileType::Audio,
        };
        let filename = uploads::random_filename(&file.filename);
        self.uploads
            .save(UploadDir::PersonalLogs, &filename, &file.bytes)
            .await?;

        let log = entities::personal_log::ActiveModel {
            member_id: Set(member_id),
            title: Set(title),
            filename: Set(filename.clone()),
            original_filename: Set(uploads::display_name(&file.filename)),
            file_type: Set(file_type),
            ..Default::default()
        };

        match log.insert(&self.db.conn).await {
            Ok(model) => {
                log::info!(
                    "Personal log created for member {}: '{}' (ID: {})",
                    member_id,
                    model.title,
                    model.id
                );
                Ok(model)
            }
            Err(e) => {
                self.uploads.remove(UploadDir::PersonalLogs, &filename).await;
                Err(e.into())
            }
        }
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let log = entities::personal_log::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| AppError::not_found(PERSONAL_LOG_NOT_FOUND))?;

        entities::personal_log::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await?;
        self.uploads
            .remove(UploadDir::PersonalLogs, &log.filename)
            .await;

        log::info!("Personal log deleted (ID: {}): {}", id, log.filename);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;

    async fn member(ctx: &TestContext) -> i64 {
        ctx.member_service()
            .create("Alice".into(), "Guitar".into())
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_detects_type_and_randomizes_name() {
        let ctx = TestContext::new().await;
        let member_id = member(&ctx).await;
        let service = ctx.personal_log_service();

        let audio = service
            .create(
                member_id,
                Some("  Scales  ".into()),
                Some(ctx.file("scales.FLAC", b"fLaC")),
            )
            .await
            .unwrap();
        assert_eq!(audio.title, "Scales");
        assert_eq!(audio.file_type, PersonalLogFileType::Audio);
        assert_eq!(audio.original_filename, "scales.FLAC");
        assert!(audio.filename.ends_with(".flac"));
        assert_ne!(audio.filename, "scales.flac");

        let video = service
            .create(member_id, Some("Cam".into()), Some(ctx.file("cam.webm", b"webm")))
            .await
            .unwrap();
        assert_eq!(video.file_type, PersonalLogFileType::Video);

        let saved =
            std::fs::read(ctx.uploads.path_for(UploadDir::PersonalLogs, &video.filename)).unwrap();
        assert_eq!(saved, b"webm");
    }

    #[tokio::test]
    async fn test_create_validation_order() {
        let ctx = TestContext::new().await;
        let member_id = member(&ctx).await;
        let service = ctx.personal_log_service();

        let err = service.create(999, None, None).await.unwrap_err();
        assert_eq!(err.to_string(), MEMBER_NOT_FOUND);

        let err = service
            .create(member_id, Some("  ".into()), Some(ctx.file("a.mp3", b"")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "title is required");

        let err = service
            .create(member_id, Some("x".repeat(201)), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("title"));

        let err = service
            .create(member_id, Some("Take".into()), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No file provided");

        let err = service
            .create(member_id, Some("Take".into()), Some(ctx.file("chart.pdf", b"%PDF")))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("File type not allowed"));

        assert_eq!(ctx.uploaded_file_count(), 0);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let ctx = TestContext::new().await;
        let member_id = member(&ctx).await;
        let service = ctx.personal_log_service();

        let first = service
            .create(member_id, Some("First".into()), Some(ctx.file("a.mp3", b"a")))
            .await
            .unwrap();
        let second = service
            .create(member_id, Some("Second".into()), Some(ctx.file("b.mp3", b"b")))
            .await
            .unwrap();

        let titles: Vec<_> = service
            .list_for_member(member_id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.title)
            .collect();
        assert_eq!(titles, ["Second", "First"]);

        service.delete(first.id).await.unwrap();
        assert!(!ctx.uploads.exists(UploadDir::PersonalLogs, &first.filename).await);
        assert!(ctx.uploads.exists(UploadDir::PersonalLogs, &second.filename).await);

        let err = service.delete(first.id).await.unwrap_err();
        assert_eq!(err.to_string(), PERSONAL_LOG_NOT_FOUND);
    }
}
