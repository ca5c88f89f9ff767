//! Generic adapter for boards that expose a JSON search endpoint.
//!
//! The endpoint is called as `GET {endpoint}?q=..&location=..&limit=..&page=..`
//! and may answer with a bare array or an object holding a `jobs`, `results`,
//! or `data` array. Pages are requested until the limit is reached or a page
//! comes back short.

mod pacing;
mod response;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jobpacker_core::{AppConfig, SearchQuery, SourceError, SourceId};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::adapter::{AdapterRegistry, FetchContext, SourceAdapter, SourceFetch};
use pacing::RequestPacer;
use response::{parse_page, Page};

/// Hard stop for the paging loop.
const MAX_PAGES: u32 = 20;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query features a board can honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCapabilities {
    /// The board refuses keyword-less searches.
    pub requires_keywords: bool,
    pub job_type_filter: bool,
    pub remote_filter: bool,
}

impl BoardCapabilities {
    #[must_use]
    pub fn for_source(source: SourceId) -> Self {
        match source {
            SourceId::Google => Self {
                requires_keywords: true,
                job_type_filter: true,
                remote_filter: true,
            },
            SourceId::Glassdoor => Self {
                requires_keywords: false,
                job_type_filter: false,
                remote_filter: true,
            },
            SourceId::Indeed | SourceId::LinkedIn | SourceId::ZipRecruiter => Self {
                requires_keywords: false,
                job_type_filter: true,
                remote_filter: true,
            },
        }
    }

    /// # Errors
    ///
    /// Returns an `Unsupported` [`SourceError`] naming the first feature of
    /// `query` this board cannot honor.
    pub fn check(&self, query: &SearchQuery) -> Result<(), SourceError> {
        if self.requires_keywords && query.keywords.is_empty() {
            return Err(SourceError::unsupported("board requires search keywords"));
        }
        if !self.job_type_filter {
            if let Some(job_type) = query.job_type {
                return Err(SourceError::unsupported(format!(
                    "board cannot filter by job type '{job_type}'"
                )));
            }
        }
        if !self.remote_filter && query.remote_only {
            return Err(SourceError::unsupported("board cannot filter remote-only listings"));
        }
        Ok(())
    }
}

/// Connection settings for one [`HttpBoardAdapter`].
#[derive(Debug, Clone)]
pub struct HttpBoardSettings {
    pub endpoint: String,
    pub user_agent: String,
    /// Listings requested per page.
    pub page_size: u32,
    /// Minimum spacing between two requests to this board.
    pub min_interval: Duration,
}

pub struct HttpBoardAdapter {
    source: SourceId,
    endpoint: Url,
    client: Client,
    page_size: u32,
    capabilities: BoardCapabilities,
    pacer: RequestPacer,
}

impl HttpBoardAdapter {
    /// # Errors
    ///
    /// Returns a `Fatal` [`SourceError`] if the endpoint is not an absolute
    /// URL or the HTTP client cannot be constructed.
    pub fn new(source: SourceId, settings: HttpBoardSettings) -> Result<Self, SourceError> {
        let endpoint = Url::parse(settings.endpoint.trim()).map_err(|e| {
            SourceError::fatal(format!("invalid endpoint for {source}: {e}"))
        })?;
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(settings.user_agent)
            .build()
            .map_err(|e| SourceError::fatal(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            source,
            endpoint,
            client,
            page_size: settings.page_size.max(1),
            capabilities: BoardCapabilities::for_source(source),
            pacer: RequestPacer::new(settings.min_interval),
        })
    }

    fn page_params(query: &SearchQuery, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        if !query.keywords.is_empty() {
            params.push(("q", query.keywords.clone()));
        }
        if !query.location.is_empty() {
            params.push(("location", query.location.clone()));
        }
        params.push(("limit", page_size.to_string()));
        params.push(("page", page.to_string()));
        if query.remote_only {
            params.push(("remote", "true".to_string()));
        }
        if let Some(job_type) = query.job_type {
            params.push(("job_type", job_type.as_str().to_string()));
        }
        params
    }

    async fn fetch_page(
        &self,
        query: &SearchQuery,
        page: u32,
        page_size: u32,
        ctx: &FetchContext,
    ) -> Result<Page, SourceError> {
        self.pacer.wait(ctx).await?;

        let remaining = ctx.remaining();
        if remaining.is_zero() {
            return Err(SourceError::timeout("deadline passed before request"));
        }

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&Self::page_params(query, page, page_size))
            .timeout(remaining)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            return Err(SourceError::rate_limited(match retry_after {
                Some(secs) => format!("HTTP 429 (retry after {secs}s)"),
                None => "HTTP 429".to_string(),
            }));
        }
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            return Err(SourceError::fatal(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(SourceError::transient(format!("unexpected HTTP {status}")));
        }

        let body = response.text().await.map_err(request_error)?;
        parse_page(&body)
    }
}

fn request_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::timeout(format!("request timed out: {e}"))
    } else {
        SourceError::transient(format!("request failed: {e}"))
    }
}

#[async_trait]
impl SourceAdapter for HttpBoardAdapter {
    fn source(&self) -> SourceId {
        self.source
    }

    async fn fetch(
        &self,
        query: &SearchQuery,
        limit: u32,
        ctx: &FetchContext,
    ) -> Result<SourceFetch, SourceError> {
        self.capabilities.check(query)?;

        let wanted = usize::try_from(limit).unwrap_or(usize::MAX);
        let page_size = self.page_size.min(limit.max(1));
        let mut results = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch = match self.fetch_page(query, page, page_size, ctx).await {
                Ok(batch) => batch,
                Err(error) if results.is_empty() => return Err(error),
                Err(error) => {
                    tracing::warn!(source = %self.source, page, count = results.len(), error = %error, "page failed after earlier pages succeeded");
                    return Ok(SourceFetch::partial(results, error));
                }
            };
            let short = batch.listed < usize::try_from(page_size).unwrap_or(usize::MAX);
            results.extend(batch.results);
            tracing::debug!(source = %self.source, page, count = results.len(), "fetched page");
            if short || results.len() >= wanted {
                break;
            }
        }

        results.truncate(wanted);
        Ok(SourceFetch::complete(results))
    }
}

impl std::fmt::Debug for HttpBoardAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Endpoints may embed API keys.
        f.debug_struct("HttpBoardAdapter")
            .field("source", &self.source)
            .field("host", &self.endpoint.host_str())
            .field("page_size", &self.page_size)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// One [`HttpBoardAdapter`] per board with a configured endpoint. Boards whose
/// adapter cannot be built are logged and left unregistered.
#[must_use]
pub fn registry_from_config(config: &AppConfig) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    for source in config.configured_boards() {
        let Some(endpoint) = config.board(source).and_then(|b| b.endpoint.clone()) else {
            continue;
        };
        let settings = HttpBoardSettings {
            endpoint,
            user_agent: config.user_agent.clone(),
            page_size: config.page_size,
            min_interval: Duration::from_millis(config.inter_request_delay_ms),
        };
        match HttpBoardAdapter::new(source, settings) {
            Ok(adapter) => registry.register(Arc::new(adapter)),
            Err(e) => tracing::error!(source = %source, error = %e, "cannot build board adapter"),
        }
    }
    registry
}
