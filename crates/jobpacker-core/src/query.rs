use crate::source::{JobType, SourceId};
use crate::ConfigError;

pub const MIN_RESULTS_PER_SOURCE: u32 = 1;
pub const MAX_RESULTS_PER_SOURCE: u32 = 100;
pub const DEFAULT_RESULTS_PER_SOURCE: u32 = 15;

/// One user search, shared read-only with every adapter in a harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: String,
    pub location: String,
    pub results_per_source: u32,
    /// Requested boards, in the order the caller asked for them. The order
    /// drives outcome reporting and dedup tie-breaking.
    sources: Vec<SourceId>,
    pub remote_only: bool,
    pub job_type: Option<JobType>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(keywords: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into().trim().to_string(),
            location: location.into().trim().to_string(),
            results_per_source: DEFAULT_RESULTS_PER_SOURCE,
            sources: Vec::new(),
            remote_only: false,
            job_type: None,
        }
    }

    /// Sets the requested boards. Repeated boards keep their first position.
    #[must_use]
    pub fn with_sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = SourceId>,
    {
        self.sources.clear();
        for source in sources {
            if !self.sources.contains(&source) {
                self.sources.push(source);
            }
        }
        self
    }

    #[must_use]
    pub fn with_results_per_source(mut self, limit: u32) -> Self {
        self.results_per_source = limit;
        self
    }

    #[must_use]
    pub fn with_remote_only(mut self, remote_only: bool) -> Self {
        self.remote_only = remote_only;
        self
    }

    #[must_use]
    pub fn with_job_type(mut self, job_type: Option<JobType>) -> Self {
        self.job_type = job_type;
        self
    }

    #[must_use]
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// Position of `source` in the requested order, or `usize::MAX` when absent.
    #[must_use]
    pub fn source_rank(&self, source: SourceId) -> usize {
        self.sources
            .iter()
            .position(|s| *s == source)
            .unwrap_or(usize::MAX)
    }

    /// Check the query before any board is contacted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSourcesSelected`] when no board is enabled, or
    /// [`ConfigError::Validation`] when `results_per_source` is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSourcesSelected);
        }
        if !(MIN_RESULTS_PER_SOURCE..=MAX_RESULTS_PER_SOURCE).contains(&self.results_per_source)
        {
            return Err(ConfigError::Validation(format!(
                "results per source must be between {MIN_RESULTS_PER_SOURCE} and \
                 {MAX_RESULTS_PER_SOURCE}, got {}",
                self.results_per_source
            )));
        }
        Ok(())
    }
}
