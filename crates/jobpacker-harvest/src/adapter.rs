//! The contract every job-board adapter satisfies.
//!
//! Adapters are self-contained: anything stateful they need (HTTP clients,
//! pacing, credentials) is passed in at construction and never shared with
//! another adapter.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jobpacker_core::{SearchQuery, SourceError, SourceId};
use serde_json::{Map, Value};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One listing as a board returned it. Field names vary by board; only the
/// normalizer registered for that board interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult(Map<String, Value>);

impl RawResult {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a JSON value, or `None` if it is not an object.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// First non-null value among `keys`.
    pub(crate) fn first(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find(|v| !v.is_null())
    }
}

/// Raw results from one adapter invocation.
#[derive(Debug, Clone, Default)]
pub struct SourceFetch {
    /// In the board's own relevance order.
    pub results: Vec<RawResult>,
    /// Set when the board failed after some results had already arrived.
    pub interrupted: Option<SourceError>,
}

impl SourceFetch {
    #[must_use]
    pub fn complete(results: Vec<RawResult>) -> Self {
        Self {
            results,
            interrupted: None,
        }
    }

    #[must_use]
    pub fn partial(results: Vec<RawResult>, error: SourceError) -> Self {
        Self {
            results,
            interrupted: Some(error),
        }
    }
}

/// Deadline and cancellation signal handed to one adapter invocation.
#[derive(Debug, Clone)]
pub struct FetchContext {
    deadline: Instant,
    cancel: CancellationToken,
}

impl FetchContext {
    #[must_use]
    pub fn new(deadline: Instant, cancel: CancellationToken) -> Self {
        Self { deadline, cancel }
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline; zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when the harvest is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

/// A job board queried through one uniform interface.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> SourceId;

    /// Fetch at most `limit` raw listings for `query`.
    ///
    /// Implementations must return before `ctx.deadline()`; the orchestrator
    /// reports an adapter that overruns as timed out either way.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] describing why the board produced nothing.
    async fn fetch(
        &self,
        query: &SearchQuery,
        limit: u32,
        ctx: &FetchContext,
    ) -> Result<SourceFetch, SourceError>;
}

/// Maps each board to exactly one adapter.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<SourceId, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` under its own source, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        let source = adapter.source();
        if self.adapters.insert(source, adapter).is_some() {
            tracing::warn!(source = %source, "replaced previously registered adapter");
        }
    }

    #[must_use]
    pub fn with(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.register(adapter);
        self
    }

    #[must_use]
    pub fn get(&self, source: SourceId) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(&source).cloned()
    }

    #[must_use]
    pub fn sources(&self) -> Vec<SourceId> {
        self.adapters.keys().copied().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("sources", &self.sources())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(RawResult::from_json(json!([1, 2])).is_none());
        assert!(RawResult::from_json(json!("title")).is_none());
        assert!(RawResult::from_json(json!({"title": "x"})).is_some());
    }

    #[test]
    fn first_skips_missing_and_null_keys() {
        let raw = RawResult::from_json(json!({"a": null, "b": "bee", "c": "sea"})).unwrap();
        assert_eq!(raw.first(&["missing", "a", "b", "c"]), Some(&json!("bee")));
        assert!(raw.first(&["a", "missing"]).is_none());
    }

    #[tokio::test]
    async fn remaining_is_zero_after_deadline() {
        let ctx = FetchContext::new(Instant::now(), CancellationToken::new());
        assert_eq!(ctx.remaining(), Duration::ZERO);
        assert!(!ctx.is_cancelled());
    }

    struct Stub(SourceId);

    #[async_trait]
    impl SourceAdapter for Stub {
        fn source(&self) -> SourceId {
            self.0
        }

        async fn fetch(
            &self,
            _query: &SearchQuery,
            _limit: u32,
            _ctx: &FetchContext,
        ) -> Result<SourceFetch, SourceError> {
            Ok(SourceFetch::default())
        }
    }

    #[test]
    fn registry_keys_adapters_by_source() {
        let registry = AdapterRegistry::new()
            .with(Arc::new(Stub(SourceId::Google)))
            .with(Arc::new(Stub(SourceId::Indeed)));
        assert_eq!(registry.sources(), vec![SourceId::Indeed, SourceId::Google]);
        assert!(registry.get(SourceId::LinkedIn).is_none());
        assert_eq!(registry.get(SourceId::Google).unwrap().source(), SourceId::Google);
    }
}
