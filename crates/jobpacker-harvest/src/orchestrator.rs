//! Fan a query out to every enabled board and fold the answers into one
//! ordered, deduplicated result.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use jobpacker_core::{
    AppConfig, HarvestResult, JobPosting, SearchQuery, SourceError, SourceId, SourceOutcome,
};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::adapter::{AdapterRegistry, FetchContext, SourceFetch};
use crate::dedupe::dedupe;
use crate::error::HarvestError;
use crate::normalize::normalize_all;

const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Stand-in deadline when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

type FetchResult = Result<SourceFetch, SourceError>;

/// Per-board deadlines for one harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOptions {
    default_timeout: Duration,
    timeouts: BTreeMap<SourceId, Duration>,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_TIMEOUT)
    }
}

impl HarvestOptions {
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            timeouts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, source: SourceId, timeout: Duration) -> Self {
        self.timeouts.insert(source, timeout);
        self
    }

    #[must_use]
    pub fn timeout_for(&self, source: SourceId) -> Duration {
        self.timeouts
            .get(&source)
            .copied()
            .unwrap_or(self.default_timeout)
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let mut options = Self::new(Duration::from_secs(config.source_timeout_secs));
        for (source, board) in &config.boards {
            if let Some(secs) = board.timeout_secs {
                options.timeouts.insert(*source, Duration::from_secs(secs));
            }
        }
        options
    }
}

/// Runs harvests against a fixed set of adapters.
#[derive(Debug, Clone)]
pub struct Harvester {
    registry: AdapterRegistry,
}

impl Harvester {
    #[must_use]
    pub fn new(registry: AdapterRegistry) -> Self {
        Self { registry }
    }

    /// Query every enabled board concurrently and return the merged result.
    ///
    /// Each board is fetched exactly once under its own deadline. Board
    /// failures are reported in [`HarvestResult::outcomes`] and never abort
    /// the harvest.
    ///
    /// # Errors
    ///
    /// - [`HarvestError::Config`] if the query is invalid; no board is contacted.
    /// - [`HarvestError::Cancelled`] if `cancel` fires before every board settles.
    pub async fn harvest(
        &self,
        query: &SearchQuery,
        options: &HarvestOptions,
        cancel: &CancellationToken,
    ) -> Result<HarvestResult, HarvestError> {
        query.validate()?;
        if cancel.is_cancelled() {
            return Err(HarvestError::Cancelled);
        }

        let requested = query.sources().to_vec();
        let limit = query.results_per_source;
        let shared = Arc::new(query.clone());
        let mut settled: Vec<Option<FetchResult>> = requested.iter().map(|_| None).collect();
        let mut tasks: JoinSet<(usize, FetchResult)> = JoinSet::new();

        for (slot, &source) in requested.iter().enumerate() {
            let Some(adapter) = self.registry.get(source) else {
                settled[slot] = Some(Err(SourceError::fatal("no adapter registered")));
                continue;
            };
            let timeout = options.timeout_for(source);
            let deadline = deadline_after(timeout);
            let ctx = FetchContext::new(deadline, cancel.clone());
            let query = Arc::clone(&shared);

            tasks.spawn(async move {
                let result =
                    match tokio::time::timeout_at(deadline, adapter.fetch(&query, limit, &ctx))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(SourceError::timeout(format!(
                            "no response within {}s",
                            timeout.as_secs_f64()
                        ))),
                    };
                (slot, result)
            });
        }

        let cancelled = tokio::select! {
            biased;
            () = cancel.cancelled() => true,
            () = drain(&mut tasks, &mut settled) => false,
        };
        if cancelled {
            tasks.shutdown().await;
            tracing::info!(sources = requested.len(), "harvest cancelled");
            return Err(HarvestError::Cancelled);
        }

        let mut postings: Vec<JobPosting> = Vec::new();
        let mut outcomes: Vec<SourceOutcome> = Vec::with_capacity(requested.len());

        for (slot, &source) in requested.iter().enumerate() {
            let result = settled[slot]
                .take()
                .unwrap_or_else(|| Err(SourceError::fatal("adapter task panicked")));
            let outcome = match result {
                Ok(mut fetch) => {
                    fetch
                        .results
                        .truncate(usize::try_from(limit).unwrap_or(usize::MAX));
                    let (normalized, skipped) = normalize_all(source, &fetch.results);
                    let count = normalized.len();
                    postings.extend(normalized);
                    match fetch.interrupted {
                        None => SourceOutcome::success(source, count, skipped),
                        Some(error) if count == 0 => {
                            tracing::warn!(source = %source, error = %error, "source failed");
                            SourceOutcome {
                                skipped,
                                ..SourceOutcome::failed(source, error)
                            }
                        }
                        Some(error) => {
                            tracing::warn!(source = %source, count, error = %error, "source returned partial results");
                            SourceOutcome::partial(source, count, skipped, error)
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(source = %source, error = %error, "source failed");
                    SourceOutcome::failed(source, error)
                }
            };
            outcomes.push(outcome);
        }

        let merged = postings.len();
        let mut postings = dedupe(postings, &requested);
        postings.sort_by(|a, b| compare_postings(a, b, query));
        make_ids_unique(&mut postings);

        let result = HarvestResult { postings, outcomes };
        tracing::info!(
            sources = requested.len(),
            failed = result.failed_sources().len(),
            merged,
            postings = result.postings.len(),
            "harvest complete"
        );
        Ok(result)
    }
}

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

async fn drain(
    tasks: &mut JoinSet<(usize, FetchResult)>,
    settled: &mut [Option<FetchResult>],
) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((slot, result)) => settled[slot] = Some(result),
            Err(e) => tracing::error!(error = %e, "source task did not complete"),
        }
    }
}

/// Newest first (undated last), then board relevance, then title, then the
/// requested board order, then id.
fn compare_postings(a: &JobPosting, b: &JobPosting, query: &SearchQuery) -> Ordering {
    b.date_posted
        .cmp(&a.date_posted)
        .then(a.rank.cmp(&b.rank))
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| query.source_rank(a.source).cmp(&query.source_rank(b.source)))
        .then_with(|| a.id.cmp(&b.id))
}

/// Suffix repeated ids with `-2`, `-3`, ... in result order.
fn make_ids_unique(postings: &mut [JobPosting]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(postings.len());
    for posting in postings.iter_mut() {
        if seen.insert(posting.id.clone()) {
            continue;
        }
        let base = posting.id.clone();
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}-{n}");
            if seen.insert(candidate.clone()) {
                posting.id = candidate;
                break;
            }
            n += 1;
        }
    }
}
