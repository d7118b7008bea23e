use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use crate::config::Config;
use crate::database::Database;
use crate::entities::song::SongStatus;
use crate::http_server::{app, state::AppState};
use crate::services::{
    dashboard::DashboardService, media::MediaService, member::MemberService,
    personal_log::PersonalLogService, practice_log::PracticeLogService,
    song::{NewSong, SongService},
    suggestion::SuggestionService,
};
use crate::uploads::{PERSONAL_LOGS_DIR, UploadStore, UploadedFile};

/// In-memory database with every migration applied
pub async fn test_db() -> Arc<Database> {
    Arc::new(Database::in_memory().await.unwrap())
}

pub fn new_song(title: &str, artist: &str) -> NewSong {
    NewSong {
        title: title.to_string(),
        artist: artist.to_string(),
        status: SongStatus::Practice,
        lyrics: None,
        chords: None,
        link: None,
        memo: None,
        genre: None,
        difficulty: 3,
    }
}

/// A fresh database and upload root, removed when dropped.
pub struct TestContext {
    pub db: Arc<Database>,
    pub uploads: Arc<UploadStore>,
    pub config: Config,
    _dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let uploads = Arc::new(UploadStore::open(dir.path()).await.unwrap());
        let config = Config::default().with_upload_directory(dir.path());

        Self {
            db: test_db().await,
            uploads,
            config,
            _dir: dir,
        }
    }

    pub fn file(&self, name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    /// Regular files under the upload root and its subdirectories
    pub fn uploaded_file_count(&self) -> usize {
        fn count(dir: &Path) -> usize {
            std::fs::read_dir(dir)
                .unwrap()
                .filter_map(Result::ok)
                .filter(|entry| entry.path().is_file())
                .count()
        }
        let root = self.uploads.root();
        count(root) + count(&root.join(PERSONAL_LOGS_DIR))
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::new(AppState {
            db: self.db.clone(),
            uploads: self.uploads.clone(),
            config: self.config.clone(),
        })
    }

    pub fn router(&self) -> Router {
        app::router(self.state()).unwrap()
    }

    pub fn song_service(&self) -> SongService {
        SongService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn media_service(&self) -> MediaService {
        MediaService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn practice_log_service(&self) -> PracticeLogService {
        PracticeLogService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn member_service(&self) -> MemberService {
        MemberService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn personal_log_service(&self) -> PersonalLogService {
        PersonalLogService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn suggestion_service(&self) -> SuggestionService {
        SuggestionService::new(self.db.clone())
    }

    pub fn dashboard_service(&self) -> DashboardService {
        DashboardService::new(self.db.clone())
    }
}
