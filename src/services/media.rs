use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::error::{AppError, AppResult};
use crate::services::song::SONG_NOT_FOUND;
use crate::uploads::{self, UploadDir, UploadStore, UploadedFile};

pub const MEDIA_NOT_FOUND: &str = "Media not found";

/// Files attached to songs: sheet music, demos, rehearsal videos.
pub struct MediaService {
    db: Arc<Database>,
    uploads: Arc<UploadStore>,
}

struct StoredFile {
    filename: String,
    size: u64,
}

impl MediaService {
    pub fn new(db: Arc<Database>, uploads: Arc<UploadStore>) -> Self {
        Self { db, uploads }
    }

    async fn find_song(&self, song_id: i64) -> AppResult<entities::song::Model> {
        entities::song::Entity::find_by_id(song_id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| AppError::not_found(SONG_NOT_FOUND))
    }

    async fn find(&self, id: i64) -> AppResult<entities::media::Model> {
        entities::media::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| AppError::not_found(MEDIA_NOT_FOUND))
    }

    /// Validate and write an upload under a fresh random name.
    async fn store(&self, file: &UploadedFile) -> AppResult<StoredFile> {
        uploads::check_song_media_extension(&file.filename)?;

        let filename = uploads::random_filename(&file.filename);
        let size = self
            .uploads
            .save(UploadDir::Root, &filename, &file.bytes)
            .await?;

        Ok(StoredFile { filename, size })
    }

    fn new_record(
        song_id: i64,
        file: &UploadedFile,
        stored: &StoredFile,
    ) -> entities::media::ActiveModel {
        entities::media::ActiveModel {
            song_id: Set(song_id),
            filename: Set(stored.filename.clone()),
            original_filename: Set(uploads::display_name(&file.filename)),
            file_type: Set(uploads::media_kind(&file.filename).into()),
            file_size: Set(stored.size as i64),
            ..Default::default()
        }
    }

    pub async fn list_for_song(&self, song_id: i64) -> AppResult<Vec<entities::media::Model>> {
        self.find_song(song_id).await?;

        let media = entities::media::Entity::find()
            .filter(entities::media::Column::SongId.eq(song_id))
            .order_by_desc(entities::media::Column::CreatedAt)
            .order_by_desc(entities::media::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(media)
    }

    pub async fn add_to_song(
        &self,
        song_id: i64,
        file: Option<UploadedFile>,
    ) -> AppResult<entities::media::Model> {
        self.find_song(song_id).await?;
        let file = uploads::require_file(file)?;
        let stored = self.store(&file).await?;

        match Self::new_record(song_id, &file, &stored)
            .insert(&self.db.conn)
            .await
        {
            Ok(media) => {
                log::info!(
                    "Media added to song {}: '{}' as {} (ID: {})",
                    song_id,
                    media.original_filename,
                    media.filename,
                    media.id
                );
                Ok(media)
            }
            Err(e) => {
                self.uploads.remove(UploadDir::Root, &stored.filename).await;
                Err(e.into())
            }
        }
    }

    /// Store a file as media of the song and point the song's `sheet_music` at it.
    pub async fn upload_sheet_music(
        &self,
        song_id: i64,
        file: Option<UploadedFile>,
    ) -> AppResult<entities::song::Model> {
        let song = self.find_song(song_id).await?;
        let file = uploads::require_file(file)?;
        let stored = self.store(&file).await?;

        let record = Self::new_record(song_id, &file, &stored);
        let sheet_music = stored.filename.clone();
        let result = self
            .db
            .conn
            .transaction::<_, entities::song::Model, AppError>(|txn| {
                Box::pin(async move {
                    record.insert(txn).await?;

                    let mut active: entities::song::ActiveModel = song.into();
                    active.sheet_music = Set(Some(sheet_music));
                    Ok(active.update(txn).await?)
                })
            })
            .await;

        match result {
            Ok(song) => {
                log::info!("Sheet music uploaded for song {}: {}", song.id, stored.filename);
                Ok(song)
            }
            Err(e) => {
                self.uploads.remove(UploadDir::Root, &stored.filename).await;
                Err(e.into())
            }
        }
    }

    /// Give a media file a new display name and a matching storage key.
    ///
    /// The key is `<song id>_<upload date>_<name>`, built from the stored
    /// record. The original extension is always kept.
    #[instrument(skip(self))]
    pub async fn rename(&self, id: i64, new_name: &str) -> AppResult<entities::media::Model> {
        let media = self.find(id).await?;

        let mut display = uploads::sanitize_filename(new_name);
        if let Some(ext) = uploads::extension(&media.filename)
            && uploads::extension(&display).as_deref() != Some(ext.as_str())
        {
            display = format!("{display}.{ext}");
        }
        let new_key = format!(
            "{}_{}_{}",
            media.song_id,
            media.created_at.format("%Y%m%d"),
            display
        );

        let old_key = media.filename.clone();
        let mut moved = false;
        if new_key != old_key {
            if self.uploads.exists(UploadDir::Root, &new_key).await {
                return Err(AppError::validation(format!(
                    "A file named '{display}' already exists"
                )));
            }

            if self.uploads.exists(UploadDir::Root, &old_key).await {
                self.uploads
                    .rename(UploadDir::Root, &old_key, &new_key)
                    .await?;
                moved = true;
            } else {
                log::warn!(
                    "Media {} file {} is missing on disk, renaming metadata only",
                    id,
                    old_key
                );
            }
        }

        let song_id = media.song_id;
        let key = new_key.clone();
        let previous = old_key.clone();
        let result = self
            .db
            .conn
            .transaction::<_, entities::media::Model, AppError>(|txn| {
                Box::pin(async move {
                    let mut active: entities::media::ActiveModel = media.into();
                    active.filename = Set(key.clone());
                    active.original_filename = Set(display);
                    let updated = active.update(txn).await?;

                    // Keep the song's sheet_music pointing at the same file
                    if let Some(song) = entities::song::Entity::find_by_id(song_id).one(txn).await?
                        && song.sheet_music.as_deref() == Some(previous.as_str())
                    {
                        let mut song: entities::song::ActiveModel = song.into();
                        song.sheet_music = Set(Some(key));
                        song.update(txn).await?;
                    }

                    Ok(updated)
                })
            })
            .await;

        match result {
            Ok(updated) => {
                log::info!("Media renamed (ID: {}): {} -> {}", id, old_key, updated.filename);
                Ok(updated)
            }
            Err(e) => {
                if moved
                    && let Err(undo) = self
                        .uploads
                        .rename(UploadDir::Root, &new_key, &old_key)
                        .await
                {
                    log::error!("Failed to restore {} after rename error: {:?}", old_key, undo);
                }
                Err(e.into())
            }
        }
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let media = self.find(id).await?;
        let filename = media.filename.clone();
        let song_id = media.song_id;

        self.db
            .conn
            .transaction::<_, (), AppError>(|txn| {
                Box::pin(async move {
                    entities::media::Entity::delete_by_id(id).exec(txn).await?;

                    if let Some(song) = entities::song::Entity::find_by_id(song_id).one(txn).await?
                        && song.sheet_music.as_deref() == Some(media.filename.as_str())
                    {
                        let mut song: entities::song::ActiveModel = song.into();
                        song.sheet_music = Set(None);
                        song.update(txn).await?;
                    }

                    Ok(())
                })
            })
            .await?;

        self.uploads.remove(UploadDir::Root, &filename).await;
        log::info!("Media deleted (ID: {}): {}", id, filename);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::media::MediaFileType;
    use crate::test_utils::{TestContext, new_song};

    #[tokio::test]
    async fn test_upload_sheet_music_records_media() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.media_service();

        let updated = service
            .upload_sheet_music(song.id, Some(ctx.file("Sheet.PDF", b"%PDF-1.4 fake")))
            .await
            .unwrap();

        let sheet = updated.sheet_music.expect("sheet music should be set");
        assert!(sheet.ends_with(".pdf"));
        assert_ne!(sheet, "Sheet.PDF");

        let media = service.list_for_song(song.id).await.unwrap();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].filename, sheet);
        assert_eq!(media[0].original_filename, "Sheet.PDF");
        assert_eq!(media[0].file_type, MediaFileType::Document);
        assert_eq!(media[0].file_size, 13);

        let on_disk = std::fs::read(ctx.uploads.path_for(UploadDir::Root, &sheet)).unwrap();
        assert_eq!(on_disk, b"%PDF-1.4 fake");
    }

    #[tokio::test]
    async fn test_rejected_upload_leaves_no_trace() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.media_service();

        let err = service
            .upload_sheet_music(song.id, Some(ctx.file("malware.exe", b"MZ")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service.add_to_song(song.id, None).await.unwrap_err();
        assert_eq!(err.to_string(), "No file provided");

        let err = service
            .add_to_song(song.id, Some(ctx.file("", b"data")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No file selected");

        assert!(service.list_for_song(song.id).await.unwrap().is_empty());
        assert_eq!(ctx.uploaded_file_count(), 0);
        let song = ctx.song_service().get(song.id).await.unwrap();
        assert_eq!(song.sheet_music, None);
    }

    #[tokio::test]
    async fn test_missing_song_wins_over_missing_file() {
        let ctx = TestContext::new().await;
        let err = ctx
            .media_service()
            .upload_sheet_music(999, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_media_detects_type() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.media_service();

        let audio = service
            .add_to_song(song.id, Some(ctx.file("demo.m4a", b"ftyp")))
            .await
            .unwrap();
        let video = service
            .add_to_song(song.id, Some(ctx.file("gig.MOV", b"moov")))
            .await
            .unwrap();
        let image = service
            .add_to_song(song.id, Some(ctx.file("chart.png", b"\x89PNG")))
            .await
            .unwrap();

        assert_eq!(audio.file_type, MediaFileType::Audio);
        assert_eq!(video.file_type, MediaFileType::Video);
        assert!(video.filename.ends_with(".mov"));
        assert_eq!(image.file_type, MediaFileType::Image);

        // Adding media does not touch sheet_music
        let song = ctx.song_service().get(song.id).await.unwrap();
        assert_eq!(song.sheet_music, None);
    }

    #[tokio::test]
    async fn test_rename_moves_file_and_keeps_extension() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.media_service();
        let updated_song = service
            .upload_sheet_music(song.id, Some(ctx.file("sheet.pdf", b"%PDF")))
            .await
            .unwrap();
        let media = service.list_for_song(song.id).await.unwrap().remove(0);

        let renamed = service.rename(media.id, "Final Chart").await.unwrap();

        let expected = format!(
            "{}_{}_Final_Chart.pdf",
            song.id,
            media.created_at.format("%Y%m%d")
        );
        assert_eq!(renamed.filename, expected);
        assert_eq!(renamed.original_filename, "Final_Chart.pdf");
        assert!(ctx.uploads.exists(UploadDir::Root, &expected).await);
        assert!(
            !ctx.uploads
                .exists(UploadDir::Root, updated_song.sheet_music.as_deref().unwrap())
                .await
        );

        let song = ctx.song_service().get(song.id).await.unwrap();
        assert_eq!(song.sheet_music.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_rename_rejects_existing_target() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.media_service();
        let first = service
            .add_to_song(song.id, Some(ctx.file("a.pdf", b"a")))
            .await
            .unwrap();
        let second = service
            .add_to_song(song.id, Some(ctx.file("b.pdf", b"b")))
            .await
            .unwrap();

        service.rename(first.id, "chart.pdf").await.unwrap();
        let err = service.rename(second.id, "chart").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let second_now = service.find(second.id).await.unwrap();
        assert_eq!(second_now.filename, second.filename);
    }

    #[tokio::test]
    async fn test_rename_without_file_updates_metadata() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.media_service();
        let media = service
            .add_to_song(song.id, Some(ctx.file("a.mp3", b"id3")))
            .await
            .unwrap();
        std::fs::remove_file(ctx.uploads.path_for(UploadDir::Root, &media.filename)).unwrap();

        let renamed = service.rename(media.id, "take two").await.unwrap();
        assert_eq!(renamed.original_filename, "take_two.mp3");
        assert!(!ctx.uploads.exists(UploadDir::Root, &renamed.filename).await);
    }

    #[tokio::test]
    async fn test_delete_media_clears_sheet_music() {
        let ctx = TestContext::new().await;
        let song = ctx
            .song_service()
            .create(new_song("Yesterday", "Beatles"))
            .await
            .unwrap();
        let service = ctx.media_service();
        let updated = service
            .upload_sheet_music(song.id, Some(ctx.file("sheet.pdf", b"%PDF")))
            .await
            .unwrap();
        let sheet = updated.sheet_music.unwrap();
        let media = service.list_for_song(song.id).await.unwrap().remove(0);

        service.delete(media.id).await.unwrap();

        assert!(!ctx.uploads.exists(UploadDir::Root, &sheet).await);
        assert!(service.list_for_song(song.id).await.unwrap().is_empty());
        let song = ctx.song_service().get(song.id).await.unwrap();
        assert_eq!(song.sheet_music, None);
        assert!(matches!(
            service.delete(media.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
