use crate::{FeedResult, FeedStatsError};
use serde::Serialize;
use serde_json::{Map, Value};

/// One friend entry; owned by its person, no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Friend {
    pub hobbies: Vec<String>,
}

/// One decoded feed record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub id: Value,
    pub name: String,
    pub city: String,
    pub age: u64,
    pub friends: Vec<Friend>,
}

impl Person {
    pub fn num_friends(&self) -> usize {
        self.friends.len()
    }

    /// Typed view of a validated record. `index` is the 0-based record position,
    /// used only for error reporting.
    pub fn from_record(index: usize, record: &Value) -> FeedResult<Self> {
        let obj = record
            .as_object()
            .ok_or_else(|| invalid(index, "<record>", "is not a JSON object"))?;
        let id = field(index, obj, "id")?.clone();
        let name = string_field(index, obj, "name")?;
        let city = string_field(index, obj, "city")?;
        let age = age_field(index, field(index, obj, "age")?)?;
        let friends = field(index, obj, "friends")?
            .as_array()
            .ok_or_else(|| invalid(index, "friends", "is not a list"))?
            .iter()
            .enumerate()
            .map(|(i, friend)| friend_from_value(index, i, friend))
            .collect::<FeedResult<Vec<_>>>()?;
        Ok(Self {
            id,
            name,
            city,
            age,
            friends,
        })
    }
}

/// Convert every record, in input order.
pub fn people_from_records(records: &[Value]) -> FeedResult<Vec<Person>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| Person::from_record(i, record))
        .collect()
}

fn invalid(index: usize, field: &str, reason: impl Into<String>) -> FeedStatsError {
    FeedStatsError::InvalidRecord {
        index,
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn field<'a>(index: usize, obj: &'a Map<String, Value>, name: &str) -> FeedResult<&'a Value> {
    match obj.get(name) {
        None | Some(Value::Null) => Err(invalid(index, name, "is missing")),
        Some(value) => Ok(value),
    }
}

fn string_field(index: usize, obj: &Map<String, Value>, name: &str) -> FeedResult<String> {
    field(index, obj, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(index, name, "is not a string"))
}

fn age_field(index: usize, value: &Value) -> FeedResult<u64> {
    if let Some(age) = value.as_u64() {
        return Ok(age);
    }
    // integral floats such as 30.0 are accepted
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(invalid(
            index,
            "age",
            format!("must be a non-negative integer, got {value}"),
        )),
    }
}

fn friend_from_value(index: usize, position: usize, value: &Value) -> FeedResult<Friend> {
    let field_name = format!("friends[{position}].hobbies");
    let hobbies = value
        .get("hobbies")
        .ok_or_else(|| invalid(index, &field_name, "is missing"))?
        .as_array()
        .ok_or_else(|| invalid(index, &field_name, "is not a list"))?
        .iter()
        .map(|h| {
            h.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(index, &field_name, format!("contains non-string {h}")))
        })
        .collect::<FeedResult<Vec<_>>>()?;
    Ok(Friend { hobbies })
}
