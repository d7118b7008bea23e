//! Request and response bodies of the REST API.
//!
//! Requests are deserialized leniently and then turned into service inputs by
//! their `validate` methods, which report the first problem found.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::entities::{
    self, media::MediaFileType, personal_log::PersonalLogFileType, song::SongStatus,
};
use crate::error::{AppError, AppResult};
use crate::services::{
    dashboard::DashboardStats,
    member::MemberChanges,
    practice_log::{NewPracticeLog, PracticeLogChanges},
    song::{NewSong, SongChanges, SongFilter},
    suggestion::VoteType,
};
use crate::uploads::PERSONAL_LOGS_DIR;
use crate::validation::{self, GENRE_MAX_LEN, LINK_MAX_LEN, NAME_MAX_LEN, SONG_TEXT_MAX_LEN};

const DEFAULT_DIFFICULTY: i32 = 3;

/// Marks a field as sent, even when its value is `null`.
///
/// Used with `#[serde(default)]`: an absent field stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn optional_max_length(value: Option<&str>, field: &str, max: usize) -> AppResult<()> {
    match value {
        Some(value) => validation::max_length(value, field, max),
        None => Ok(()),
    }
}

fn parse_date(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| AppError::validation("date must be an RFC 3339 timestamp"))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// Songs

#[derive(Debug, Default, Deserialize)]
pub struct SongQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
}

impl From<SongQuery> for SongFilter {
    fn from(query: SongQuery) -> Self {
        Self {
            q: query.q,
            status: query.status,
            genre: query.genre,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    title: Option<String>,
    artist: Option<String>,
    #[serde(default, deserialize_with = "present")]
    status: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    difficulty: Option<Value>,
    lyrics: Option<String>,
    chords: Option<String>,
    link: Option<String>,
    memo: Option<String>,
    genre: Option<String>,
}

impl CreateSongRequest {
    pub fn validate(self) -> AppResult<NewSong> {
        let title = validation::required_string(self.title.as_deref(), "title")?;
        let artist = validation::required_string(self.artist.as_deref(), "artist")?;

        validation::max_length(&title, "title", SONG_TEXT_MAX_LEN)?;
        validation::max_length(&artist, "artist", SONG_TEXT_MAX_LEN)?;
        optional_max_length(self.genre.as_deref(), "genre", GENRE_MAX_LEN)?;
        optional_max_length(self.link.as_deref(), "link", LINK_MAX_LEN)?;

        let status = match self.status {
            Some(status) => validation::status(status.as_str())?,
            None => SongStatus::Practice,
        };
        let difficulty = match self.difficulty {
            Some(difficulty) => validation::difficulty(&difficulty)?,
            None => DEFAULT_DIFFICULTY,
        };

        Ok(NewSong {
            title,
            artist,
            status,
            lyrics: self.lyrics,
            chords: self.chords,
            link: self.link,
            memo: self.memo,
            genre: self.genre,
            difficulty,
        })
    }
}

/// Only the fields present in the body are changed. `null` clears the
/// optional text fields and is rejected for the others.
#[derive(Debug, Deserialize)]
pub struct UpdateSongRequest {
    #[serde(default, deserialize_with = "present")]
    title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    artist: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    status: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    difficulty: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    lyrics: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    chords: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    link: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    memo: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    genre: Option<Option<String>>,
}

impl UpdateSongRequest {
    pub fn validate(self) -> AppResult<SongChanges> {
        let title = self
            .title
            .map(|title| validation::non_empty_string(title.as_deref(), "title"))
            .transpose()?;
        let artist = self
            .artist
            .map(|artist| validation::non_empty_string(artist.as_deref(), "artist"))
            .transpose()?;

        optional_max_length(title.as_deref(), "title", SONG_TEXT_MAX_LEN)?;
        optional_max_length(artist.as_deref(), "artist", SONG_TEXT_MAX_LEN)?;
        optional_max_length(self.genre.clone().flatten().as_deref(), "genre", GENRE_MAX_LEN)?;
        optional_max_length(self.link.clone().flatten().as_deref(), "link", LINK_MAX_LEN)?;

        let status = self
            .status
            .map(|status| validation::status(status.as_str()))
            .transpose()?;
        let difficulty = self
            .difficulty
            .map(|difficulty| validation::difficulty(&difficulty))
            .transpose()?;

        Ok(SongChanges {
            title,
            artist,
            status,
            difficulty,
            lyrics: self.lyrics,
            chords: self.chords,
            link: self.link,
            memo: self.memo,
            genre: self.genre,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SongResponse {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub status: &'static str,
    pub lyrics: Option<String>,
    pub chords: Option<String>,
    pub link: Option<String>,
    pub memo: Option<String>,
    pub genre: Option<String>,
    pub difficulty: i32,
    pub sheet_music: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Only filled in for single-song responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaResponse>>,
}

impl From<entities::song::Model> for SongResponse {
    fn from(song: entities::song::Model) -> Self {
        Self {
            id: song.id,
            title: song.title,
            artist: song.artist,
            status: song.status.as_str(),
            lyrics: song.lyrics,
            chords: song.chords,
            link: song.link,
            memo: song.memo,
            genre: song.genre,
            difficulty: song.difficulty,
            sheet_music: song.sheet_music,
            created_at: song.created_at,
            updated_at: song.updated_at,
            media: None,
        }
    }
}

impl SongResponse {
    pub fn with_media(mut self, media: Vec<entities::media::Model>) -> Self {
        self.media = Some(media.into_iter().map(MediaResponse::from).collect());
        self
    }
}

// Media

#[derive(Debug, Deserialize)]
pub struct RenameMediaRequest {
    new_filename: Option<String>,
}

impl RenameMediaRequest {
    pub fn validate(self) -> AppResult<String> {
        let name = validation::required_string(self.new_filename.as_deref(), "new_filename")?;
        validation::max_length(&name, "new_filename", validation::TITLE_MAX_LEN)?;
        Ok(name)
    }
}

#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub id: i64,
    pub song_id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_type: MediaFileType,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    /// Download path for the stored file
    pub url: String,
}

impl From<entities::media::Model> for MediaResponse {
    fn from(media: entities::media::Model) -> Self {
        Self {
            url: format!("/uploads/{}", media.filename),
            id: media.id,
            song_id: media.song_id,
            filename: media.filename,
            original_filename: media.original_filename,
            file_type: media.file_type,
            file_size: media.file_size,
            created_at: media.created_at,
        }
    }
}

// Practice logs

#[derive(Debug, Deserialize)]
pub struct CreatePracticeLogRequest {
    date: Option<String>,
    content: Option<String>,
    feedback: Option<String>,
}

impl CreatePracticeLogRequest {
    pub fn validate(self) -> AppResult<NewPracticeLog> {
        let date = self.date.as_deref().map(parse_date).transpose()?;
        Ok(NewPracticeLog {
            date,
            content: self.content,
            feedback: self.feedback,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePracticeLogRequest {
    #[serde(default, deserialize_with = "present")]
    date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    content: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    feedback: Option<Option<String>>,
}

impl UpdatePracticeLogRequest {
    pub fn validate(self) -> AppResult<PracticeLogChanges> {
        let date = match self.date {
            Some(Some(date)) => Some(parse_date(&date)?),
            Some(None) => return Err(AppError::validation("date cannot be empty")),
            None => None,
        };
        Ok(PracticeLogChanges {
            date,
            content: self.content,
            feedback: self.feedback,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PracticeLogResponse {
    pub id: i64,
    pub song_id: i64,
    pub date: DateTime<Utc>,
    pub content: Option<String>,
    pub feedback: Option<String>,
    pub recording: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entities::practice_log::Model> for PracticeLogResponse {
    fn from(log: entities::practice_log::Model) -> Self {
        Self {
            id: log.id,
            song_id: log.song_id,
            date: log.date,
            content: log.content,
            feedback: log.feedback,
            recording: log.recording,
            created_at: log.created_at,
            updated_at: log.updated_at,
        }
    }
}

// Members

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    name: Option<String>,
    instrument: Option<String>,
}

impl CreateMemberRequest {
    pub fn validate(self) -> AppResult<(String, String)> {
        let name = validation::required_string(self.name.as_deref(), "name")?;
        validation::max_length(&name, "name", NAME_MAX_LEN)?;
        let instrument = validation::required_string(self.instrument.as_deref(), "instrument")?;
        validation::max_length(&instrument, "instrument", NAME_MAX_LEN)?;
        Ok((name, instrument))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    #[serde(default, deserialize_with = "present")]
    name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    instrument: Option<Option<String>>,
}

impl UpdateMemberRequest {
    pub fn validate(self) -> AppResult<MemberChanges> {
        let mut changes = MemberChanges::default();
        if let Some(name) = self.name {
            let name = validation::required_string(name.as_deref(), "name")?;
            validation::max_length(&name, "name", NAME_MAX_LEN)?;
            changes.name = Some(name);
        }
        if let Some(instrument) = self.instrument {
            let instrument = validation::required_string(instrument.as_deref(), "instrument")?;
            validation::max_length(&instrument, "instrument", NAME_MAX_LEN)?;
            changes.instrument = Some(instrument);
        }
        Ok(changes)
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: i64,
    pub name: String,
    pub instrument: String,
}

impl From<entities::member::Model> for MemberResponse {
    fn from(member: entities::member::Model) -> Self {
        Self {
            id: member.id,
            name: member.name,
            instrument: member.instrument,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonalLogResponse {
    pub id: i64,
    pub member_id: i64,
    pub title: String,
    pub filename: String,
    pub original_filename: String,
    pub file_type: PersonalLogFileType,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

impl From<entities::personal_log::Model> for PersonalLogResponse {
    fn from(log: entities::personal_log::Model) -> Self {
        Self {
            url: format!("/uploads/{}/{}", PERSONAL_LOGS_DIR, log.filename),
            id: log.id,
            member_id: log.member_id,
            title: log.title,
            filename: log.filename,
            original_filename: log.original_filename,
            file_type: log.file_type,
            created_at: log.created_at,
        }
    }
}

// Suggestions

#[derive(Debug, Deserialize)]
pub struct CreateSuggestionRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    vote_type: Option<Value>,
}

impl VoteRequest {
    pub fn validate(self) -> AppResult<VoteType> {
        VoteType::parse(self.vote_type.as_ref().and_then(Value::as_str))
    }
}

/// Password from a suggestion delete body. Anything unreadable has none.
pub fn delete_password(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("password")?.as_str().map(str::to_string)
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub link: String,
    pub thumbs_up: i32,
    pub thumbs_down: i32,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

impl From<entities::song_suggestion::Model> for SuggestionResponse {
    fn from(suggestion: entities::song_suggestion::Model) -> Self {
        Self {
            score: suggestion.score(),
            id: suggestion.id,
            title: suggestion.title,
            artist: suggestion.artist,
            link: suggestion.link,
            thumbs_up: suggestion.thumbs_up,
            thumbs_down: suggestion.thumbs_down,
            created_at: suggestion.created_at,
        }
    }
}

// Dashboard

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_songs: u64,
    pub status_counts: BTreeMap<String, u64>,
    pub recent_practice_logs: Vec<PracticeLogResponse>,
    pub total_practice_logs: u64,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_songs: stats.total_songs,
            status_counts: stats.status_counts,
            recent_practice_logs: stats
                .recent_practice_logs
                .into_iter()
                .map(PracticeLogResponse::from)
                .collect(),
            total_practice_logs: stats.total_practice_logs,
        }
    }
}
