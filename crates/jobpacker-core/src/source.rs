use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A job board the harvester knows how to query.
///
/// Declaration order is the default request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceId {
    #[serde(rename = "indeed")]
    Indeed,
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "glassdoor")]
    Glassdoor,
    #[serde(rename = "zip_recruiter")]
    ZipRecruiter,
    #[serde(rename = "google")]
    Google,
}

impl SourceId {
    pub const ALL: [SourceId; 5] = [
        SourceId::Indeed,
        SourceId::LinkedIn,
        SourceId::Glassdoor,
        SourceId::ZipRecruiter,
        SourceId::Google,
    ];

    /// Stable lowercase identifier, used in exports, ids, and preferences.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Indeed => "indeed",
            SourceId::LinkedIn => "linkedin",
            SourceId::Glassdoor => "glassdoor",
            SourceId::ZipRecruiter => "zip_recruiter",
            SourceId::Google => "google",
        }
    }

    /// Prefix for per-board env vars, e.g. `JOBPACKER_ZIP_RECRUITER_ENDPOINT`.
    #[must_use]
    pub fn env_key(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "indeed" => Ok(SourceId::Indeed),
            "linkedin" | "linked_in" => Ok(SourceId::LinkedIn),
            "glassdoor" => Ok(SourceId::Glassdoor),
            "zip_recruiter" | "ziprecruiter" => Ok(SourceId::ZipRecruiter),
            "google" => Ok(SourceId::Google),
            _ => Err(ConfigError::Validation(format!("unknown job board '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "fulltime")]
    FullTime,
    #[serde(rename = "parttime")]
    PartTime,
    #[serde(rename = "contract")]
    Contract,
    #[serde(rename = "internship")]
    Internship,
}

impl JobType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::FullTime => "fulltime",
            JobType::PartTime => "parttime",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
        }
    }

    /// Parse a user-supplied job type. `"any"` and the empty string mean no filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for unrecognized values.
    pub fn parse_filter(s: &str) -> Result<Option<Self>, ConfigError> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "" | "any" | "none" => Ok(None),
            "fulltime" => Ok(Some(JobType::FullTime)),
            "parttime" => Ok(Some(JobType::PartTime)),
            "contract" => Ok(Some(JobType::Contract)),
            "internship" => Ok(Some(JobType::Internship)),
            _ => Err(ConfigError::Validation(format!("unknown job type '{s}'"))),
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
