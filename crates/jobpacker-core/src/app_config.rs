use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::source::SourceId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Per-board settings read from `JOBPACKER_<BOARD>_*` variables.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BoardSettings {
    /// Search endpoint. A board without one has no adapter this run.
    pub endpoint: Option<String>,
    /// Overrides [`AppConfig::source_timeout_secs`] for this board.
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for BoardSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Endpoints often carry API keys in their query string.
        f.debug_struct("BoardSettings")
            .field("endpoint", &self.endpoint.as_ref().map(|_| "[redacted]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Directory holding `preferences.json` and `last_run.json`.
    pub state_dir: PathBuf,
    pub source_timeout_secs: u64,
    pub user_agent: String,
    pub inter_request_delay_ms: u64,
    pub page_size: u32,
    pub boards: BTreeMap<SourceId, BoardSettings>,
}

impl AppConfig {
    #[must_use]
    pub fn board(&self, source: SourceId) -> Option<&BoardSettings> {
        self.boards.get(&source)
    }

    /// Boards with an endpoint configured, in declaration order.
    #[must_use]
    pub fn configured_boards(&self) -> Vec<SourceId> {
        SourceId::ALL
            .into_iter()
            .filter(|s| self.board(*s).is_some_and(|b| b.endpoint.is_some()))
            .collect()
    }
}
