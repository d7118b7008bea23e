pub mod dashboard;
pub mod files;
pub mod media;
pub mod members;
pub mod personal_logs;
pub mod practice_logs;
pub mod songs;
pub mod suggestions;
