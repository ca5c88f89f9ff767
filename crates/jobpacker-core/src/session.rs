//! On-disk session state: preferences plus the most recent harvest.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::outcome::HarvestResult;
use crate::preferences::Preferences;
use crate::ConfigError;

const PREFERENCES_FILE: &str = "preferences.json";
const LAST_RUN_FILE: &str = "last_run.json";

/// The most recent harvest, kept so it can be exported later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastRun {
    pub run_id: Uuid,
    pub harvested_at: DateTime<Utc>,
    pub keywords: String,
    pub location: String,
    pub result: HarvestResult,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn preferences_path(&self) -> PathBuf {
        self.dir.join(PREFERENCES_FILE)
    }

    #[must_use]
    pub fn last_run_path(&self) -> PathBuf {
        self.dir.join(LAST_RUN_FILE)
    }

    #[must_use]
    pub fn load_preferences(&self) -> Preferences {
        Preferences::load(&self.preferences_path())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::StateIo`] if the file cannot be written.
    pub fn save_preferences(&self, prefs: &Preferences) -> Result<(), ConfigError> {
        prefs.save(&self.preferences_path())
    }

    /// Replace the stored last run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StateIo`] if the directory or file cannot be written.
    pub fn save_last_run(&self, run: &LastRun) -> Result<(), ConfigError> {
        let path = self.last_run_path();
        std::fs::create_dir_all(&self.dir).map_err(|e| ConfigError::StateIo {
            path: self.dir.display().to_string(),
            source: e,
        })?;
        let body = serde_json::to_string_pretty(run).map_err(|e| ConfigError::StateParse {
            path: path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&path, body).map_err(|e| ConfigError::StateIo {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Load the stored last run, or `None` if no harvest has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StateIo`] or [`ConfigError::StateParse`] when the
    /// file exists but cannot be read or parsed.
    pub fn load_last_run(&self) -> Result<Option<LastRun>, ConfigError> {
        let path = self.last_run_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::StateIo {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::StateParse {
                path: path.display().to_string(),
                source: e,
            })
    }
}
