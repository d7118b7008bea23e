use std::path::{Path, PathBuf};

use color_eyre::{Result, eyre::Context};
use serde::{Deserialize, Serialize};

const MEGABYTE: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    database: String,
    /// Full connection string, takes precedence over `database`
    database_url: Option<String>,
    upload_directory: String,
    max_upload_mb: usize,
    /// Allowed CORS origins, an empty list allows any origin
    cors_origins: Vec<String>,
    /// Shared secret for deleting song suggestions. Not real authentication.
    suggestion_delete_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "~/.local/share/band-archive/band_archive.db".to_string(),
            database_url: None,
            upload_directory: "~/.local/share/band-archive/uploads".to_string(),
            max_upload_mb: 50,
            cors_origins: Vec::new(),
            suggestion_delete_password: "admin".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("band-archive").join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to the default path unless a file is already there
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| color_eyre::eyre::eyre!("No config directory on this platform"))?;

        if path.exists() {
            log::info!("Config already exists at: {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    pub fn database_path(&self) -> PathBuf {
        self.expand_path(&self.database)
    }

    /// Explicit connection string: `DATABASE_URL` env, then `database_url`.
    /// `None` means the SQLite file at [`Config::database_path`].
    pub fn database_url(&self) -> Option<String> {
        std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.database_url.clone())
    }

    pub fn upload_path(&self) -> PathBuf {
        self.expand_path(&self.upload_directory)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(MEGABYTE)
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn suggestion_delete_password(&self) -> &str {
        &self.suggestion_delete_password
    }

    #[cfg(test)]
    pub fn with_upload_directory(mut self, path: &Path) -> Self {
        self.upload_directory = path.to_string_lossy().to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
upload_directory = "/srv/band/uploads"
cors_origins = ["http://localhost:5173"]
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.upload_path(), PathBuf::from("/srv/band/uploads"));
        assert_eq!(config.cors_origins(), ["http://localhost:5173".to_string()]);
        assert_eq!(config.max_upload_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.suggestion_delete_password(), "admin");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_upload_mb = \"lots\"").unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_expand_home() {
        let config = Config::default();
        if let Some(home) = dirs::home_dir() {
            assert!(config.database_path().starts_with(home));
        }
    }

    #[test]
    fn test_explicit_database_url() {
        let config: Config = toml::from_str(r#"database_url = "sqlite::memory:""#).unwrap();
        if std::env::var("DATABASE_URL").is_err() {
            assert_eq!(config.database_url().as_deref(), Some("sqlite::memory:"));
        }
    }
}
