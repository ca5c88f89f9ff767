//! Per-source outcomes and the complete result of one harvest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::posting::JobPosting;
use crate::source::SourceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    /// The board did not answer before its deadline.
    Timeout,
    /// The board asked us to back off.
    RateLimited,
    /// The board cannot honor some part of the query.
    Unsupported,
    /// Network or parse failure; safe to skip for this run.
    Transient,
    /// The adapter is misconfigured and should not be retried this run.
    Fatal,
}

impl std::fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceErrorKind::Timeout => "timeout",
            SourceErrorKind::RateLimited => "rate limited",
            SourceErrorKind::Unsupported => "unsupported",
            SourceErrorKind::Transient => "transient",
            SourceErrorKind::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Failure reported by a source adapter. Always contained in a
/// [`SourceOutcome`]; never escapes a harvest.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    #[must_use]
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Timeout, message)
    }

    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unsupported, message)
    }

    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Transient, message)
    }

    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Fatal, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    /// Some results arrived before the board failed.
    Partial,
    Failed,
    Timeout,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Partial => "partial",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub source: SourceId,
    pub status: OutcomeStatus,
    /// Postings the board contributed after normalization, before dedup.
    pub count: usize,
    /// Raw records dropped during normalization.
    pub skipped: usize,
    pub error: Option<SourceError>,
}

impl SourceOutcome {
    #[must_use]
    pub fn success(source: SourceId, count: usize, skipped: usize) -> Self {
        Self {
            source,
            status: OutcomeStatus::Success,
            count,
            skipped,
            error: None,
        }
    }

    #[must_use]
    pub fn partial(source: SourceId, count: usize, skipped: usize, error: SourceError) -> Self {
        Self {
            source,
            status: OutcomeStatus::Partial,
            count,
            skipped,
            error: Some(error),
        }
    }

    /// Outcome for a board that produced nothing. Timeouts get their own status.
    #[must_use]
    pub fn failed(source: SourceId, error: SourceError) -> Self {
        let status = if error.kind == SourceErrorKind::Timeout {
            OutcomeStatus::Timeout
        } else {
            OutcomeStatus::Failed
        };
        Self {
            source,
            status,
            count: 0,
            skipped: 0,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<SourceErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Everything one harvest produced. Owned by the caller once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestResult {
    pub postings: Vec<JobPosting>,
    /// One entry per requested board, in the requested order.
    pub outcomes: Vec<SourceOutcome>,
}

impl HarvestResult {
    #[must_use]
    pub fn failed_sources(&self) -> Vec<SourceId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed | OutcomeStatus::Timeout))
            .map(|o| o.source)
            .collect()
    }

    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.failed_sources().len() == self.outcomes.len()
    }
}
