use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::entities::song::SongStatus;
use crate::error::{AppError, AppResult};
use crate::uploads::{UploadDir, UploadStore};

pub const SONG_NOT_FOUND: &str = "Song not found";

/// Filters for [`SongService::list`]. Present filters are combined with AND.
#[derive(Debug, Default, Clone)]
pub struct SongFilter {
    /// Case-insensitive substring of title or artist
    pub q: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub status: SongStatus,
    pub lyrics: Option<String>,
    pub chords: Option<String>,
    pub link: Option<String>,
    pub memo: Option<String>,
    pub genre: Option<String>,
    pub difficulty: i32,
}

/// Partial update. `None` leaves a field untouched, for nullable fields
/// `Some(None)` clears it.
#[derive(Debug, Default, Clone)]
pub struct SongChanges {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub status: Option<SongStatus>,
    pub difficulty: Option<i32>,
    pub lyrics: Option<Option<String>>,
    pub chords: Option<Option<String>>,
    pub link: Option<Option<String>>,
    pub memo: Option<Option<String>>,
    pub genre: Option<Option<String>>,
}

pub struct SongService {
    db: Arc<Database>,
    uploads: Arc<UploadStore>,
}

impl SongService {
    pub fn new(db: Arc<Database>, uploads: Arc<UploadStore>) -> Self {
        Self { db, uploads }
    }

    pub async fn list(&self, filter: &SongFilter) -> AppResult<Vec<entities::song::Model>> {
        let mut query = entities::song::Entity::find();

        if let Some(q) = filter.q.as_deref().filter(|q| !q.is_empty()) {
            // SQLite LIKE ignores ASCII case
            let pattern = format!("%{}%", q);
            query = query.filter(
                Condition::any()
                    .add(entities::song::Column::Title.like(&pattern))
                    .add(entities::song::Column::Artist.like(&pattern)),
            );
        }

        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            match SongStatus::parse(status) {
                Some(status) => {
                    query = query.filter(entities::song::Column::Status.eq(status));
                }
                // Nothing can have an unknown status
                None => return Ok(Vec::new()),
            }
        }

        if let Some(genre) = filter.genre.as_deref().filter(|g| !g.is_empty()) {
            query = query.filter(entities::song::Column::Genre.eq(genre));
        }

        let songs = query
            .order_by_asc(entities::song::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(songs)
    }

    pub async fn get(&self, id: i64) -> AppResult<entities::song::Model> {
        entities::song::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| AppError::not_found(SONG_NOT_FOUND))
    }

    pub async fn create(&self, new_song: NewSong) -> AppResult<entities::song::Model> {
        let song = entities::song::ActiveModel {
            title: Set(new_song.title),
            artist: Set(new_song.artist),
            status: Set(new_song.status),
            lyrics: Set(new_song.lyrics),
            chords: Set(new_song.chords),
            link: Set(new_song.link),
            memo: Set(new_song.memo),
            genre: Set(new_song.genre),
            difficulty: Set(new_song.difficulty),
            ..Default::default()
        };

        let model = song.insert(&self.db.conn).await?;
        log::info!("Song created: '{}' (ID: {})", model.title, model.id);
        Ok(model)
    }

    pub async fn update(&self, id: i64, changes: SongChanges) -> AppResult<entities::song::Model> {
        let song = self.get(id).await?;
        let mut active: entities::song::ActiveModel = song.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(artist) = changes.artist {
            active.artist = Set(artist);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(difficulty) = changes.difficulty {
            active.difficulty = Set(difficulty);
        }
        if let Some(lyrics) = changes.lyrics {
            active.lyrics = Set(lyrics);
        }
        if let Some(chords) = changes.chords {
            active.chords = Set(chords);
        }
        if let Some(link) = changes.link {
            active.link = Set(link);
        }
        if let Some(memo) = changes.memo {
            active.memo = Set(memo);
        }
        if let Some(genre) = changes.genre {
            active.genre = Set(genre);
        }

        // before_save stamps updated_at, so the row is written even if nothing else changed
        let model = active.update(&self.db.conn).await?;
        log::info!("Song updated: '{}' (ID: {})", model.title, model.id);
        Ok(model)
    }

    /// Delete a song together with its media and practice logs, then their files.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let files = self
            .db
            .conn
            .transaction::<_, Vec<String>, AppError>(|txn| {
                Box::pin(async move {
                    let song = entities::song::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| AppError::not_found(SONG_NOT_FOUND))?;

                    let media = entities::media::Entity::find()
                        .filter(entities::media::Column::SongId.eq(id))
                        .all(txn)
                        .await?;
                    let practice_logs = entities::practice_log::Entity::find()
                        .filter(entities::practice_log::Column::SongId.eq(id))
                        .all(txn)
                        .await?;

                    entities::media::Entity::delete_many()
                        .filter(entities::media::Column::SongId.eq(id))
                        .exec(txn)
                        .await?;
                    entities::practice_log::Entity::delete_many()
                        .filter(entities::practice_log::Column::SongId.eq(id))
                        .exec(txn)
                        .await?;
                    entities::song::Entity::delete_by_id(id).exec(txn).await?;

                    let mut files: Vec<String> = media.into_iter().map(|m| m.filename).collect();
                    files.extend(practice_logs.into_iter().filter_map(|log| log.recording));
                    files.extend(song.sheet_music);
                    files.sort();
                    files.dedup();
                    Ok(files)
                })
            })
            .await?;

        for file in &files {
            self.uploads.remove(UploadDir::Root, file).await;
        }

        log::info!("Song deleted (ID: {}), removed {} file(s)", id, files.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestContext, new_song};

    async fn seed(service: &SongService) {
        let songs = [
            ("Bohemian Rhapsody", "Queen", "Rock", SongStatus::Completed),
            ("Yesterday", "Beatles", "Pop", SongStatus::Practice),
            ("Rock You", "Queen", "Rock", SongStatus::OnHold),
            ("Let It Be", "Beatles", "Pop", SongStatus::Practice),
        ];
        for (title, artist, genre, status) in songs {
            let mut song = new_song(title, artist);
            song.genre = Some(genre.to_string());
            song.status = status;
            service.create(song).await.unwrap();
        }
    }

    fn titles(songs: &[entities::song::Model]) -> Vec<&str> {
        songs.iter().map(|s| s.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let ctx = TestContext::new().await;
        let service = ctx.song_service();

        let song = service.create(new_song("Yesterday", "Beatles")).await.unwrap();

        assert_eq!(song.status, SongStatus::Practice);
        assert_eq!(song.difficulty, 3);
        assert_eq!(song.genre, None);
        assert_eq!(song.created_at, song.updated_at);
    }

    #[tokio::test]
    async fn test_search_matches_title_or_artist_ignoring_case() {
        let ctx = TestContext::new().await;
        let service = ctx.song_service();
        seed(&service).await;

        let filter = SongFilter {
            q: Some("queen".into()),
            ..Default::default()
        };
        let songs = service.list(&filter).await.unwrap();
        assert_eq!(titles(&songs), ["Bohemian Rhapsody", "Rock You"]);

        let filter = SongFilter {
            q: Some("ROCK".into()),
            ..Default::default()
        };
        // "Rock You" by title, "Bohemian Rhapsody" does not contain "rock"
        let songs = service.list(&filter).await.unwrap();
        assert_eq!(titles(&songs), ["Rock You"]);
    }

    #[tokio::test]
    async fn test_filters_are_combined() {
        let ctx = TestContext::new().await;
        let service = ctx.song_service();
        seed(&service).await;

        let filter = SongFilter {
            status: Some("Practice".into()),
            genre: Some("Pop".into()),
            ..Default::default()
        };
        assert_eq!(service.list(&filter).await.unwrap().len(), 2);

        let filter = SongFilter {
            q: Some("Queen".into()),
            status: Some("Completed".into()),
            ..Default::default()
        };
        let songs = service.list(&filter).await.unwrap();
        assert_eq!(titles(&songs), ["Bohemian Rhapsody"]);

        let filter = SongFilter {
            status: Some("Bogus".into()),
            ..Default::default()
        };
        assert!(service.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let ctx = TestContext::new().await;
        let service = ctx.song_service();
        let mut song = new_song("Yesterday", "Beatles");
        song.memo = Some("capo 2".into());
        let song = service.create(song).await.unwrap();

        let updated = service
            .update(
                song.id,
                SongChanges {
                    genre: Some(Some("Pop".into())),
                    memo: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Yesterday");
        assert_eq!(updated.genre.as_deref(), Some("Pop"));
        assert_eq!(updated.memo, None);
        assert!(updated.updated_at >= song.updated_at);
        assert_eq!(updated.created_at, song.created_at);
    }

    #[tokio::test]
    async fn test_missing_song_is_not_found() {
        let ctx = TestContext::new().await;
        let service = ctx.song_service();

        assert!(matches!(service.get(999).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.update(999, SongChanges::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.delete(999).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_children_and_files() {
        let ctx = TestContext::new().await;
        let service = ctx.song_service();
        let song = service.create(new_song("Yesterday", "Beatles")).await.unwrap();

        let with_sheet = ctx
            .media_service()
            .upload_sheet_music(song.id, Some(ctx.file("sheet.pdf", b"%PDF-1.4")))
            .await
            .unwrap();
        let sheet_path = ctx
            .uploads
            .path_for(UploadDir::Root, with_sheet.sheet_music.as_deref().unwrap());
        assert!(sheet_path.exists());

        ctx.practice_log_service()
            .create(song.id, Default::default())
            .await
            .unwrap();

        service.delete(song.id).await.unwrap();

        assert!(matches!(service.get(song.id).await, Err(AppError::NotFound(_))));
        let remaining_media = entities::media::Entity::find()
            .all(&ctx.db.conn)
            .await
            .unwrap();
        let remaining_logs = entities::practice_log::Entity::find()
            .all(&ctx.db.conn)
            .await
            .unwrap();
        assert!(remaining_media.is_empty());
        assert!(remaining_logs.is_empty());
        assert!(!sheet_path.exists());
    }
}
