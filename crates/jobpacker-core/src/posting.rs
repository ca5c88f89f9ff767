use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::source::SourceId;

/// Review marker assigned to every freshly harvested posting.
pub const DEFAULT_STATUS: &str = "Saved";

/// A job listing normalized from any board into one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    /// Stable within a harvest; derived deterministically when the board
    /// provides no identifier.
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    /// Canonical listing URL. Empty when the board gave none.
    pub url: String,
    pub description: String,
    /// Free-text salary, e.g. `"$100,000 - $150,000"`.
    pub salary: Option<String>,
    pub date_posted: Option<NaiveDate>,
    pub source: SourceId,
    pub status: String,
    pub tags: Vec<String>,
    /// Zero-based position in the board's own relevance ordering.
    pub rank: u32,
}

impl JobPosting {
    #[must_use]
    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }
}
