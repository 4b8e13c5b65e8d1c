use crate::{FeedResult, FeedStatsError};
use serde_json::Value;

/// Fields every person record must carry.
pub const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "city", "age", "friends"];

/// Proof that a record set passed the schema gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    pub records: usize,
}

/// Union of top-level keys across all object records, in first-seen order.
pub fn column_set(records: &[Value]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for key in records.iter().filter_map(Value::as_object).flat_map(|o| o.keys()) {
        if !columns.contains(&key.as_str()) {
            columns.push(key.as_str());
        }
    }
    columns
}

/// Gate before aggregation: the set must be non-empty and every required
/// field must appear as a column somewhere in it. Records are not modified.
pub fn validate_records(records: &[Value], required: &[&str]) -> FeedResult<Accepted> {
    if records.is_empty() {
        tracing::debug!("record set is empty, nothing to process");
        return Err(FeedStatsError::EmptyFeed);
    }
    let columns = column_set(records);
    let missing: Vec<String> = required
        .iter()
        .filter(|field| !columns.contains(*field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        tracing::debug!(?missing, "record set is missing required fields");
        return Err(FeedStatsError::MissingFields(missing));
    }
    tracing::info!(records = records.len(), "record set has all required fields");
    Ok(Accepted {
        records: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_set_is_rejected() {
        let err = validate_records(&[], &REQUIRED_FIELDS).unwrap_err();
        assert!(matches!(err, FeedStatsError::EmptyFeed));
    }

    #[test]
    fn missing_city_column_is_named() {
        let records = vec![
            json!({"id": 1, "name": "a", "age": 3, "friends": []}),
            json!({"id": 2, "name": "b", "age": 4, "friends": []}),
        ];
        match validate_records(&records, &REQUIRED_FIELDS).unwrap_err() {
            FeedStatsError::MissingFields(fields) => assert_eq!(fields, vec!["city"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_fields_reported_in_required_order() {
        let records = vec![json!({"name": "a"})];
        match validate_records(&records, &REQUIRED_FIELDS).unwrap_err() {
            FeedStatsError::MissingFields(fields) => {
                assert_eq!(fields, vec!["id", "city", "age", "friends"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn presence_is_checked_per_column_not_per_record() {
        let records = vec![
            json!({"id": 1, "name": "a", "age": 3, "friends": []}),
            json!({"id": 2, "name": "b", "city": "X", "age": 4, "friends": []}),
        ];
        let accepted = validate_records(&records, &REQUIRED_FIELDS).unwrap();
        assert_eq!(accepted.records, 2);
    }

    #[test]
    fn column_set_keeps_first_seen_order() {
        let records = vec![json!({"b": 1, "a": 2}), json!(7), json!({"c": 3, "a": 4})];
        let columns = column_set(&records);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[2], "c");
        assert!(columns.contains(&"a") && columns.contains(&"b"));
    }
}
