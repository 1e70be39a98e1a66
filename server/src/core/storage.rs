//! Local data directory
//!
//! The conference database lives at `<data dir>/sqlite/conference.db`. The
//! data dir is the platform one from `directories` (for example
//! `$XDG_DATA_HOME/conferencecentral/` on Linux) unless `CONFERENCE_DATA_DIR`
//! points elsewhere.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::constants::{APP_DOT_FOLDER, APP_NAME, ENV_DATA_DIR, SQLITE_DB_FILENAME};
use crate::utils::paths::expand_path;

const SQLITE_SUBDIR: &str = "sqlite";

#[derive(Debug, Clone)]
pub struct AppStorage {
    data_dir: PathBuf,
}

impl AppStorage {
    /// Resolve the data dir and create its layout
    pub async fn init() -> Result<Self> {
        let data_dir = Self::resolve_data_dir();
        Self::create_layout(&data_dir).await?;

        // canonicalize needs the directory to exist
        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);
        tracing::debug!(data_dir = %data_dir.display(), "Storage initialized");
        Ok(Self { data_dir })
    }

    /// `CONFERENCE_DATA_DIR`, else the platform data dir, else `./.conference`
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return expand_path(&dir);
        }
        match ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => expand_path(APP_DOT_FOLDER),
        }
    }

    async fn create_layout(data_dir: &Path) -> Result<()> {
        let sqlite_dir = data_dir.join(SQLITE_SUBDIR);
        tokio::fs::create_dir_all(&sqlite_dir)
            .await
            .with_context(|| format!("Failed to create data directory: {}", sqlite_dir.display()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_SUBDIR).join(SQLITE_DB_FILENAME)
    }

    #[cfg(test)]
    pub async fn init_for_test(data_dir: PathBuf) -> Self {
        Self::create_layout(&data_dir).await.unwrap();
        Self { data_dir }
    }
}
