//! Field checks shared by the request schemas.
//!
//! Every check returns the first problem it finds as an [`AppError::Validation`]
//! whose message names the offending field.

use serde_json::Value;

use crate::entities::song::SongStatus;
use crate::error::{AppError, AppResult};

pub const NAME_MAX_LEN: usize = 100;
pub const TITLE_MAX_LEN: usize = 200;
pub const SONG_TEXT_MAX_LEN: usize = 100;
pub const GENRE_MAX_LEN: usize = 50;
pub const LINK_MAX_LEN: usize = 200;

/// A value that must be present and contain something other than whitespace.
pub fn required_string(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::validation(format!("{field} is required"))),
    }
}

/// Like [`required_string`], for fields that were explicitly sent in an update.
pub fn non_empty_string(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::validation(format!("{field} cannot be empty"))),
    }
}

pub fn max_length(value: &str, field: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn status(value: Option<&str>) -> AppResult<SongStatus> {
    value.and_then(SongStatus::parse).ok_or_else(|| {
        let allowed = SongStatus::ALL
            .iter()
            .map(SongStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        AppError::validation(format!("Invalid status. Must be one of: {allowed}"))
    })
}

/// Accepts JSON integers 1 through 5. Floats, strings and booleans are rejected.
pub fn difficulty(value: &Value) -> AppResult<i32> {
    value
        .as_i64()
        .filter(|d| (1..=5).contains(d))
        .map(|d| d as i32)
        .ok_or_else(|| AppError::validation("difficulty must be an integer between 1 and 5"))
}
