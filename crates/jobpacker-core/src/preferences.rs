//! Persisted search defaults (`preferences.json`).
//!
//! Unknown or missing keys fall back to defaults so older files keep loading
//! after new options are added. A corrupt file is treated as absent.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::query::{SearchQuery, DEFAULT_RESULTS_PER_SOURCE};
use crate::source::{JobType, SourceId};
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub default_search: String,
    pub default_location: String,
    pub results_per_site: u32,
    pub remote_only: bool,
    pub job_type: Option<JobType>,
    pub job_boards: Vec<SourceId>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_search: String::new(),
            default_location: "USA".to_string(),
            results_per_site: DEFAULT_RESULTS_PER_SOURCE,
            remote_only: false,
            job_type: None,
            job_boards: SourceId::ALL.to_vec(),
        }
    }
}

impl Preferences {
    /// Keys accepted by [`Preferences::set`].
    pub const KEYS: [&'static str; 6] = [
        "default_search",
        "default_location",
        "results_per_site",
        "remote_only",
        "job_type",
        "job_boards",
    ];

    /// Load preferences from `path`, falling back to defaults when the file is
    /// missing, empty, or unreadable.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read preferences; using defaults");
                return Self::default();
            }
        };

        if content.trim().is_empty() {
            return Self::default();
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt preferences file; using defaults");
                Self::default()
            }
        }
    }

    /// Write preferences as indented JSON, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StateIo`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let body = serde_json::to_string_pretty(self).map_err(|e| ConfigError::StateParse {
            path: path.display().to_string(),
            source: e,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::StateIo {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, body).map_err(|e| ConfigError::StateIo {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Update one setting from its textual form.
    ///
    /// `job_boards` takes a comma-separated list or `all`; `job_type` takes
    /// `any` to clear the filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for unknown keys or unparsable values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "default_search" => self.default_search = value.trim().to_string(),
            "default_location" => self.default_location = value.trim().to_string(),
            "results_per_site" => {
                self.results_per_site = value.trim().parse::<u32>().map_err(|e| {
                    ConfigError::Validation(format!("results_per_site: {e}"))
                })?;
            }
            "remote_only" => {
                self.remote_only = match value.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "y" | "1" => true,
                    "false" | "no" | "n" | "0" => false,
                    other => {
                        return Err(ConfigError::Validation(format!(
                            "remote_only: expected true or false, got '{other}'"
                        )))
                    }
                };
            }
            "job_type" => self.job_type = JobType::parse_filter(value)?,
            "job_boards" => self.job_boards = parse_board_list(value)?,
            other => {
                return Err(ConfigError::Validation(format!(
                    "unknown setting '{other}'; expected one of: {}",
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Build a query from these defaults. Callers override fields afterwards.
    #[must_use]
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery::new(self.default_search.clone(), self.default_location.clone())
            .with_sources(self.job_boards.iter().copied())
            .with_results_per_source(self.results_per_site)
            .with_remote_only(self.remote_only)
            .with_job_type(self.job_type)
    }
}

/// Parse `"indeed, linkedin"` or `"all"` into boards, keeping first occurrences.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] for unknown boards or an empty list.
pub fn parse_board_list(value: &str) -> Result<Vec<SourceId>, ConfigError> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(SourceId::ALL.to_vec());
    }
    let mut boards = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let source = part.parse::<SourceId>()?;
        if !boards.contains(&source) {
            boards.push(source);
        }
    }
    if boards.is_empty() {
        return Err(ConfigError::NoSourcesSelected);
    }
    Ok(boards)
}
