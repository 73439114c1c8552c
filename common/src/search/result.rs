use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Location of the attorney aggregation inside the search API's envelope.
const BUCKETS_POINTER: &str = "/body/aggregations/attorneys/buckets";

/// One aggregation bucket: an attorney name and how many filings carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub key: String,
    pub doc_count: u64,
}

/// Pulls the bucket list out of a raw response envelope.
pub fn buckets_from_envelope(envelope: &Value) -> Result<Vec<SearchResult>, AppError> {
    let buckets = envelope
        .pointer(BUCKETS_POINTER)
        .filter(|value| !value.is_null())
        .ok_or_else(|| {
            AppError::UpstreamPayload(format!("response has no bucket list at {BUCKETS_POINTER}"))
        })?;

    Vec::<SearchResult>::deserialize(buckets)
        .map_err(|e| AppError::UpstreamPayload(format!("malformed bucket list: {e}")))
}
