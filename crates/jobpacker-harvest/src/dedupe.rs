//! Cross-board duplicate removal.

use std::collections::HashMap;

use jobpacker_core::{JobPosting, SourceId};
use url::Url;

/// Identity of a listing across boards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Url(String),
    /// Used when the posting has no URL.
    Composite {
        title: String,
        company: String,
        location: String,
    },
}

impl DedupKey {
    #[must_use]
    pub fn for_posting(posting: &JobPosting) -> Self {
        if posting.has_url() {
            Self::Url(canonical_url(&posting.url))
        } else {
            Self::Composite {
                title: fold_text(&posting.title),
                company: fold_text(&posting.company),
                location: fold_text(&posting.location),
            }
        }
    }
}

/// Canonical form used for URL comparison: fragment dropped, host lowercased,
/// trailing slash removed. Unparsable input is
/// compared as trimmed lowercase text.
#[must_use]
pub fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.trim_end_matches('/').to_lowercase();
    };
    url.set_fragment(None);
    // `Url` already lowercases the host of special schemes.
    let mut canonical = url.to_string();
    while canonical.ends_with('/') {
        canonical.pop();
    }
    canonical
}

/// Lowercase, punctuation to spaces, whitespace collapsed.
fn fold_text(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse postings that share a [`DedupKey`], keeping one representative.
///
/// A dated posting beats an undated one; otherwise the board earlier in
/// `source_order` wins; otherwise the first one seen stays. Fields are never
/// merged. The output keeps the order in which each key first appeared.
#[must_use]
pub fn dedupe(postings: Vec<JobPosting>, source_order: &[SourceId]) -> Vec<JobPosting> {
    let rank_of = |source: SourceId| {
        source_order
            .iter()
            .position(|s| *s == source)
            .unwrap_or(usize::MAX)
    };

    let mut index: HashMap<DedupKey, usize> = HashMap::with_capacity(postings.len());
    let mut kept: Vec<JobPosting> = Vec::with_capacity(postings.len());
    let mut collapsed = 0usize;

    for candidate in postings {
        let key = DedupKey::for_posting(&candidate);
        match index.get(&key) {
            None => {
                index.insert(key, kept.len());
                kept.push(candidate);
            }
            Some(&slot) => {
                collapsed += 1;
                let current = &kept[slot];
                let replace = match (candidate.date_posted.is_some(), current.date_posted.is_some()) {
                    (true, false) => true,
                    (false, true) => false,
                    _ => rank_of(candidate.source) < rank_of(current.source),
                };
                if replace {
                    kept[slot] = candidate;
                }
            }
        }
    }

    if collapsed > 0 {
        tracing::debug!(collapsed, remaining = kept.len(), "collapsed duplicate postings");
    }
    kept
}
