use crate::aggregate::aggregate;
use crate::model::people_from_records;
use crate::schema::validate_records;
use crate::source::RecordSource;
use crate::summary::FeedSummary;
use crate::FeedResult;
use serde_json::Value;

/// Validate, type and aggregate an already materialized record set.
/// Nothing is aggregated unless the whole set passes.
pub fn process_records(records: &[Value], required: &[&str]) -> FeedResult<FeedSummary> {
    let accepted = validate_records(records, required)?;
    let people = people_from_records(records)?;
    let summary = aggregate(&people)?;
    tracing::info!(
        records = accepted.records,
        cities = summary.average_age_per_city.len(),
        "aggregation complete"
    );
    Ok(summary)
}

/// Drain the source, then process. Any failure is terminal for the run.
pub async fn run(source: RecordSource, required: &[&str]) -> FeedResult<FeedSummary> {
    let records = source.collect().await?;
    process_records(&records, required)
}
