//! Record source: frames a byte stream into lines and decodes one JSON value per line.

use crate::io::{build_feed_reader, reader_from_path, reader_from_stdin, FeedMeta, FeedReader};
use crate::{FeedResult, FeedStatsError};
use bytes::Bytes;
use futures::{future, Stream, StreamExt, TryStreamExt};
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::AsyncRead;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};

pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 << 20;

/// Where the feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    Stdin,
    Path(PathBuf),
}

impl FeedLocation {
    /// `-` means stdin, anything else is a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }
}

/// Explicit source configuration, handed to `RecordSource::open`.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub location: FeedLocation,
    /// Overrides the meta otherwise guessed from the location.
    pub meta: Option<FeedMeta>,
    pub max_line_length: usize,
}

impl SourceConfig {
    pub fn new(location: FeedLocation) -> Self {
        Self {
            location,
            meta: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    pub fn with_meta(mut self, meta: FeedMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }
}

/// A finite, single-use sequence of decoded records.
pub struct RecordSource {
    reader: FeedReader,
    max_line_length: usize,
}

impl RecordSource {
    /// Acquire the stream described by `config`.
    pub async fn open(config: SourceConfig) -> FeedResult<Self> {
        let reader = match (&config.location, &config.meta) {
            (FeedLocation::Path(path), None) => reader_from_path(path).await?.0,
            (FeedLocation::Path(path), Some(meta)) => {
                let file = tokio::fs::File::open(path).await?;
                build_feed_reader(file, meta)
            }
            (FeedLocation::Stdin, None) => reader_from_stdin().0,
            (FeedLocation::Stdin, Some(meta)) => build_feed_reader(tokio::io::stdin(), meta),
        };
        tracing::debug!(location = ?config.location, "opened record source");
        Ok(Self {
            reader,
            max_line_length: config.max_line_length,
        })
    }

    /// Use an already-acquired reader (already decompressed and UTF-8).
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            reader: Box::new(reader),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Lazy stream of records. Blank lines are skipped; the first error ends the stream.
    pub fn records(self) -> impl Stream<Item = FeedResult<Value>> + Send {
        let max = self.max_line_length;
        let codec = AnyDelimiterCodec::new_with_max_length(vec![b'\n'], Vec::new(), max);
        FramedRead::new(self.reader, codec)
            .enumerate()
            .filter_map(move |(i, frame)| future::ready(decode_frame(i + 1, frame, max).transpose()))
            .scan(false, |failed, item| {
                if *failed {
                    return future::ready(None);
                }
                *failed = item.is_err();
                future::ready(Some(item))
            })
    }

    /// Materialize every record, failing on the first bad line.
    pub async fn collect(self) -> FeedResult<Vec<Value>> {
        let records: Vec<Value> = self.records().try_collect().await?;
        tracing::info!(records = records.len(), "feed ingested");
        Ok(records)
    }
}

fn decode_frame(
    line: usize,
    frame: Result<Bytes, AnyDelimiterCodecError>,
    max: usize,
) -> FeedResult<Option<Value>> {
    let bytes = match frame {
        Ok(bytes) => bytes,
        Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
            return Err(FeedStatsError::LineTooLong { line, max })
        }
        Err(AnyDelimiterCodecError::Io(e)) => return Err(FeedStatsError::Transport(e)),
    };
    // keep-alive lines
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| {
            tracing::debug!(line, error = %source, "failed to decode feed line");
            FeedStatsError::Decode { line, source }
        })
}
