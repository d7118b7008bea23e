pub mod media;
pub mod member;
pub mod personal_log;
pub mod practice_log;
pub mod song;
pub mod song_suggestion;
