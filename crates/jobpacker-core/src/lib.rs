//! Shared domain types for the job harvester.
//!
//! Holds the canonical posting schema, search queries, per-source outcomes,
//! environment configuration, and the on-disk preferences/session store.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod outcome;
pub mod posting;
pub mod preferences;
pub mod query;
pub mod session;
pub mod source;

pub use app_config::{AppConfig, BoardSettings, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use outcome::{HarvestResult, OutcomeStatus, SourceError, SourceErrorKind, SourceOutcome};
pub use posting::{JobPosting, DEFAULT_STATUS};
pub use preferences::Preferences;
pub use query::{SearchQuery, MAX_RESULTS_PER_SOURCE, MIN_RESULTS_PER_SOURCE};
pub use session::{LastRun, SessionStore};
pub use source::{JobType, SourceId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("no job boards selected")]
    NoSourcesSelected,

    #[error("failed to access {path}: {source}")]
    StateIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    StateParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}
