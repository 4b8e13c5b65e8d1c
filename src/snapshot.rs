//! Raw record snapshots: a whole feed saved as one indented JSON array, for offline reruns.

use crate::summary::to_indented_json;
use crate::{FeedResult, FeedStatsError};
use serde_json::Value;
use std::path::Path;

pub async fn save_records(path: &Path, records: &[Value]) -> FeedResult<()> {
    let bytes = to_indented_json(records).map_err(|e| FeedStatsError::persist(path, e.into()))?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| FeedStatsError::persist(path, e))?;
    tracing::info!(path = %path.display(), records = records.len(), "records saved");
    Ok(())
}

/// Load a snapshot written by `save_records`. A document that is not a JSON
/// array is a decode error.
pub async fn load_records(path: &Path) -> FeedResult<Vec<Value>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FeedStatsError::persist(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| FeedStatsError::Decode {
        line: source.line(),
        source,
    })
}
