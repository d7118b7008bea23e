use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use color_eyre::eyre::Context;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use unaccent::unaccent;

use crate::error::{AppError, AppResult};

pub const PERSONAL_LOGS_DIR: &str = "personal_logs";

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "aac", "flac"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv"];

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DOT_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{2,}").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Document,
}

/// Which directory under the upload root a file lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDir {
    Root,
    PersonalLogs,
}

/// A file received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Lower-cased extension after the last dot, if any.
pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

fn has_extension_in(filename: &str, allowed: &[&str]) -> bool {
    extension(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

pub fn media_kind(filename: &str) -> MediaKind {
    if has_extension_in(filename, AUDIO_EXTENSIONS) {
        MediaKind::Audio
    } else if has_extension_in(filename, VIDEO_EXTENSIONS) {
        MediaKind::Video
    } else if has_extension_in(filename, IMAGE_EXTENSIONS) {
        MediaKind::Image
    } else {
        MediaKind::Document
    }
}

fn song_media_extensions() -> impl Iterator<Item = &'static str> {
    IMAGE_EXTENSIONS
        .iter()
        .chain(DOCUMENT_EXTENSIONS)
        .chain(AUDIO_EXTENSIONS)
        .chain(VIDEO_EXTENSIONS)
        .copied()
}

fn personal_log_extensions() -> impl Iterator<Item = &'static str> {
    AUDIO_EXTENSIONS.iter().chain(VIDEO_EXTENSIONS).copied()
}

fn describe(extensions: impl Iterator<Item = &'static str>) -> String {
    let mut all: Vec<_> = extensions.collect();
    all.sort_unstable();
    all.join(", ")
}

/// Rejects files whose extension is not accepted for song media and practice recordings.
pub fn check_song_media_extension(filename: &str) -> AppResult<()> {
    if extension(filename).is_some_and(|ext| song_media_extensions().any(|e| e == ext)) {
        return Ok(());
    }
    Err(AppError::validation(format!(
        "File type not allowed. Allowed: {}",
        describe(song_media_extensions())
    )))
}

/// Rejects files that are not audio or video recordings.
pub fn check_personal_log_extension(filename: &str) -> AppResult<()> {
    if extension(filename).is_some_and(|ext| personal_log_extensions().any(|e| e == ext)) {
        return Ok(());
    }
    Err(AppError::validation(format!(
        "File type not allowed. Allowed: {}",
        describe(personal_log_extensions())
    )))
}

/// Reduce a client supplied name to `[A-Za-z0-9_.-]`.
///
/// Accented letters are transliterated first and whitespace becomes `_`.
/// Runs of dots collapse to one and leading and trailing dots and underscores
/// are removed, so the result always passes [`is_safe_name`].
pub fn sanitize_filename(name: &str) -> String {
    // Only the last path component counts
    let name = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let ascii = unaccent(name);
    let joined = WHITESPACE.replace_all(ascii.trim(), "_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    let cleaned = DOT_RUNS.replace_all(&cleaned, ".");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Name to show for an upload: the client's name without any directory part.
pub fn display_name(original: &str) -> String {
    original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// The `file` part of an upload form, rejecting a missing part or an empty name.
pub fn require_file(file: Option<UploadedFile>) -> AppResult<UploadedFile> {
    let file = file.ok_or_else(|| AppError::validation("No file provided"))?;
    if display_name(&file.filename).is_empty() {
        return Err(AppError::validation("No file selected"));
    }
    Ok(file)
}

/// Random storage key that keeps the original (lower-cased) extension.
pub fn random_filename(original: &str) -> String {
    let stem = uuid::Uuid::new_v4().simple().to_string();
    match extension(original) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// True if `name` can be joined onto an upload directory without escaping it.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
}

pub fn content_type(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        // Browsers refuse to play audio/x-m4a
        Some("m4a") => "audio/mp4",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Uploaded files on local disk.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Open the upload root, creating it and its subdirectories as needed.
    pub async fn open(root: &Path) -> color_eyre::Result<Self> {
        let personal_logs = root.join(PERSONAL_LOGS_DIR);
        tokio::fs::create_dir_all(&personal_logs)
            .await
            .wrap_err_with(|| {
                format!("Failed to create upload directory: {}", personal_logs.display())
            })?;

        log::info!("Upload directory ready at: {}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, dir: UploadDir, name: &str) -> PathBuf {
        match dir {
            UploadDir::Root => self.root.join(name),
            UploadDir::PersonalLogs => self.root.join(PERSONAL_LOGS_DIR).join(name),
        }
    }

    /// Write a new file. Fails instead of replacing an existing one.
    ///
    /// Returns the number of bytes written.
    pub async fn save(&self, dir: UploadDir, name: &str, bytes: &[u8]) -> AppResult<u64> {
        let path = self.path_for(dir, name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .wrap_err_with(|| format!("Failed to create upload: {}", path.display()))?;
        file.write_all(bytes)
            .await
            .wrap_err_with(|| format!("Failed to write upload: {}", path.display()))?;
        file.flush().await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        log::debug!("Saved upload {} ({} bytes)", path.display(), bytes.len());
        Ok(bytes.len() as u64)
    }

    pub async fn exists(&self, dir: UploadDir, name: &str) -> bool {
        tokio::fs::try_exists(self.path_for(dir, name))
            .await
            .unwrap_or(false)
    }

    pub async fn rename(&self, dir: UploadDir, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.path_for(dir, from);
        let to_path = self.path_for(dir, to);
        tokio::fs::rename(&from_path, &to_path)
            .await
            .wrap_err_with(|| {
                format!(
                    "Failed to rename {} to {}",
                    from_path.display(),
                    to_path.display()
                )
            })?;
        Ok(())
    }

    /// Best-effort delete. A missing file is not an error.
    pub async fn remove(&self, dir: UploadDir, name: &str) {
        let path = self.path_for(dir, name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::debug!("Removed upload {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove upload {}: {}", path.display(), e),
        }
    }
}
