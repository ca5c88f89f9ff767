//! Decoding of search-endpoint response bodies.

use jobpacker_core::SourceError;
use serde_json::Value;

use crate::adapter::RawResult;

/// Keys under which an object-shaped body may carry its listing array.
const LIST_KEYS: [&str; 3] = ["jobs", "results", "data"];

/// One decoded page of listings.
#[derive(Debug)]
pub(crate) struct Page {
    pub(crate) results: Vec<RawResult>,
    /// Entries the board sent, including any that were dropped. Paging
    /// decisions use this, not `results.len()`.
    pub(crate) listed: usize,
}

/// Parse one page: a bare JSON array, or an object holding the array under
/// one of [`LIST_KEYS`]. Non-object entries are dropped.
pub(crate) fn parse_page(body: &str) -> Result<Page, SourceError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SourceError::transient(format!("invalid JSON body: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => LIST_KEYS
            .iter()
            .find_map(|key| match fields.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                SourceError::transient(format!(
                    "response object has no {} array",
                    LIST_KEYS.join("/")
                ))
            })?,
        _ => return Err(SourceError::transient("response body is not a JSON array or object")),
    };

    let listed = items.len();
    let results: Vec<RawResult> = items.into_iter().filter_map(RawResult::from_json).collect();
    if results.len() < listed {
        tracing::debug!(dropped = listed - results.len(), "ignored non-object entries in page");
    }
    Ok(Page { results, listed })
}
