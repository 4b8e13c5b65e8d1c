//! Streaming NDJSON people-feed ingestion with per-city summary statistics.
//!
//! - Record source: local files, stdin, gzip/zstd, non-UTF-8 charsets.
//! - Schema gate: required fields checked across the whole record set.
//! - Aggregation: per-city means, most friends, most common name and hobby.
//!
//! Data shape:
//! - Input: one JSON object per line, `{ id, name, city, age, friends: [{ hobbies }] }`
//! - Output: `FeedSummary` (render with `Display`, persist with `save_summary`)
#![cfg_attr(docsrs, feature(doc_cfg))]
//
mod aggregate;
mod codec;
mod io;
pub mod logging;
mod model;
mod pipeline;
mod schema;
mod snapshot;
mod source;
mod summary;

pub use crate::aggregate::{aggregate, round_mean, CityGroups, FrequencyCount};
pub use crate::io::{build_feed_reader, reader_from_path, reader_from_stdin, FeedMeta, FeedReader};
pub use crate::model::{people_from_records, Friend, Person};
pub use crate::pipeline::{process_records, run};
pub use crate::schema::{column_set, validate_records, Accepted, REQUIRED_FIELDS};
pub use crate::snapshot::{load_records, save_records};
pub use crate::source::{FeedLocation, RecordSource, SourceConfig, DEFAULT_MAX_LINE_LENGTH};
pub use crate::summary::{load_summary, save_summary, CityTable, FeedSummary};

use std::path::PathBuf;
use thiserror::Error;

/// Error type returned by this crate when not using `anyhow`.
#[derive(Debug, Error)]
pub enum FeedStatsError {
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),
    #[error("line {line}: invalid JSON: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: exceeds maximum length of {max} bytes")]
    LineTooLong { line: usize, max: usize },
    #[error("no data: the feed contained no records")]
    EmptyFeed,
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("record {index}: field '{field}' {reason}")]
    InvalidRecord {
        index: usize,
        field: String,
        reason: String,
    },
    #[error("no hobbies present among any friends; most common hobby is undefined")]
    NoHobbies,
    #[error("persistence failure at {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FeedStatsError {
    /// Failure category reported to the operator.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) | Self::LineTooLong { .. } => "transport",
            Self::Decode { .. } => "decode",
            Self::EmptyFeed | Self::MissingFields(_) | Self::InvalidRecord { .. } => "schema",
            Self::NoHobbies => "aggregation",
            Self::Persist { .. } => "persistence",
        }
    }

    /// Process exit status, distinct per category. 1 and 2 stay free for
    /// generic failures and command-line usage errors.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            "transport" => 3,
            "decode" => 4,
            "schema" => 5,
            "aggregation" => 6,
            _ => 7,
        }
    }

    pub(crate) fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }
}

pub type FeedResult<T> = std::result::Result<T, FeedStatsError>;
