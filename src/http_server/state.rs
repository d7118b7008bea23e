use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::services::{
    dashboard::DashboardService, media::MediaService, member::MemberService,
    personal_log::PersonalLogService, practice_log::PracticeLogService, song::SongService,
    suggestion::SuggestionService,
};
use crate::uploads::UploadStore;

pub struct AppState {
    pub db: Arc<Database>,
    pub uploads: Arc<UploadStore>,
    pub config: Config,
}

impl AppState {
    pub fn songs(&self) -> SongService {
        SongService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn media(&self) -> MediaService {
        MediaService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn practice_logs(&self) -> PracticeLogService {
        PracticeLogService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn members(&self) -> MemberService {
        MemberService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn personal_logs(&self) -> PersonalLogService {
        PersonalLogService::new(self.db.clone(), self.uploads.clone())
    }

    pub fn suggestions(&self) -> SuggestionService {
        SuggestionService::new(self.db.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.db.clone())
    }
}
