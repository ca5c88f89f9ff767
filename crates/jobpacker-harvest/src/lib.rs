//! Multi-board harvesting engine: adapters, normalization, deduplication,
//! and the orchestrator that fans a query out to every enabled board.

pub mod adapter;
pub mod dedupe;
pub mod error;
pub mod http;
pub mod normalize;
pub mod orchestrator;

pub use adapter::{AdapterRegistry, FetchContext, RawResult, SourceAdapter, SourceFetch};
pub use dedupe::{canonical_url, dedupe, DedupKey};
pub use error::HarvestError;
pub use http::{registry_from_config, BoardCapabilities, HttpBoardAdapter, HttpBoardSettings};
pub use normalize::{derive_id, format_salary, normalize, normalize_all};
pub use orchestrator::{HarvestOptions, Harvester};
