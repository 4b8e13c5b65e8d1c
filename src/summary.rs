use crate::{FeedResult, FeedStatsError};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// city -> integer, iterated (and serialized) in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityTable(Vec<(String, u64)>);

impl CityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; an overwritten city keeps its original position.
    pub fn insert(&mut self, city: impl Into<String>, value: u64) {
        let city = city.into();
        match self.0.iter_mut().find(|(c, _)| *c == city) {
            Some(entry) => entry.1 = value,
            None => self.0.push((city, value)),
        }
    }

    pub fn get(&self, city: &str) -> Option<u64> {
        self.0.iter().find(|(c, _)| c == city).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(c, v)| (c.as_str(), *v))
    }

    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u64)> for CityTable {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (city, value) in iter {
            table.insert(city, value);
        }
        table
    }
}

impl Serialize for CityTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (city, value) in &self.0 {
            map.serialize_entry(city, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CityTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = CityTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of city names to integers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CityTable, A::Error> {
                let mut table = CityTable::new();
                while let Some((city, value)) = access.next_entry::<String, u64>()? {
                    table.insert(city, value);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// The statistics produced by one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSummary {
    pub average_age_per_city: CityTable,
    pub average_friends_per_city: CityTable,
    pub person_with_most_friends: String,
    pub most_friends_count: u64,
    pub most_common_name_count: u64,
    pub most_common_name_all_cities: String,
    pub most_common_hobby: String,
    pub most_common_hobby_count: u64,
}

impl fmt::Display for FeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The average age per city:")?;
        for (city, age) in self.average_age_per_city.iter() {
            writeln!(f, "{city}: {age}")?;
        }
        writeln!(f)?;
        writeln!(f, "Average number of friends per city:")?;
        for (city, friends) in self.average_friends_per_city.iter() {
            writeln!(f, "{city}: {friends}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Person with the most friends: {} (with {} friends)",
            self.person_with_most_friends, self.most_friends_count
        )?;
        writeln!(f)?;
        writeln!(f, "Most common name for all cities:")?;
        writeln!(
            f,
            "{} ({})",
            self.most_common_name_all_cities, self.most_common_name_count
        )?;
        writeln!(f)?;
        write!(
            f,
            "Most common hobby among all friends of all people: {} ({})",
            self.most_common_hobby, self.most_common_hobby_count
        )
    }
}

/// Serialize `value` as JSON with a 4-space indent.
pub(crate) fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}

/// Write the summary as indented JSON.
pub async fn save_summary(path: &Path, summary: &FeedSummary) -> FeedResult<()> {
    let bytes = to_indented_json(summary).map_err(|e| FeedStatsError::persist(path, e.into()))?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| FeedStatsError::persist(path, e))?;
    tracing::info!(path = %path.display(), "results saved");
    Ok(())
}

/// Read back a summary written by `save_summary`.
pub async fn load_summary(path: &Path) -> FeedResult<FeedSummary> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FeedStatsError::persist(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| FeedStatsError::persist(path, e.into()))
}
