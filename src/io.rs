use crate::FeedResult;
use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

use crate::codec::CharsetTranscoder;

pub type FeedReader = Box<dyn AsyncRead + Unpin + Send>;

#[derive(Debug, Clone)]
pub struct FeedMeta {
    /// e.g. "application/gzip" or "application/x-ndjson"
    pub content_type: String,
    /// e.g. "gzip", "zstd", or empty
    pub content_encoding: String,
    /// file name or other label (used for extension fallback)
    pub name_hint: String,
    /// Which character encoding to expect (defaults to UTF-8)
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for FeedMeta {
    fn default() -> Self {
        Self {
            content_type: String::new(),
            content_encoding: String::new(),
            name_hint: String::new(),
            charset: encoding_rs::UTF_8,
        }
    }
}

impl FeedMeta {
    /// Meta guessed from a file name: `.gz`, `.zst`, anything else is plain NDJSON.
    pub fn from_name(name: &str) -> Self {
        let (content_type, content_encoding) = if name.ends_with(".gz") {
            ("application/gzip", "gzip")
        } else if name.ends_with(".zst") {
            ("application/zstd", "zstd")
        } else {
            ("application/x-ndjson", "")
        };
        Self {
            content_type: content_type.into(),
            content_encoding: content_encoding.into(),
            name_hint: name.to_string(),
            ..Default::default()
        }
    }

    fn has_encoding(&self, token: &str) -> bool {
        self.content_encoding
            .to_ascii_lowercase()
            .split(',')
            .any(|s| s.trim() == token)
    }

    pub fn is_gzip(&self) -> bool {
        let ct = self.content_type.to_ascii_lowercase();
        self.has_encoding("gzip")
            || matches!(ct.as_str(), "application/gzip" | "application/x-gzip")
            || self.name_hint.ends_with(".gz")
    }

    pub fn is_zstd(&self) -> bool {
        self.has_encoding("zstd")
            || self.content_type.eq_ignore_ascii_case("application/zstd")
            || self.name_hint.ends_with(".zst")
    }
}

/// Wrap a raw byte stream with optional decompression and UTF-8 transcoding.
/// Decompression is chosen by encoding, then content type, then extension.
pub fn build_feed_reader<R>(raw: R, meta: &FeedMeta) -> FeedReader
where
    R: AsyncRead + Unpin + Send + 'static,
{
    // 1 MiB buffer keeps syscalls down on large feeds
    let buf = BufReader::with_capacity(1 << 20, raw);
    let decompressed: FeedReader = if meta.is_gzip() {
        Box::new(GzipDecoder::new(buf))
    } else if meta.is_zstd() {
        Box::new(ZstdDecoder::new(buf))
    } else {
        Box::new(buf)
    };

    if meta.charset == encoding_rs::UTF_8 {
        return decompressed;
    }
    tracing::debug!(charset = meta.charset.name(), "transcoding feed to UTF-8");
    let framed = FramedRead::new(decompressed, CharsetTranscoder::new(meta.charset));
    Box::new(StreamReader::new(framed))
}

/// Build a reader from a local file path (meta from extension only).
pub async fn reader_from_path(path: &Path) -> FeedResult<(FeedReader, FeedMeta)> {
    let file = File::open(path).await?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let meta = FeedMeta::from_name(name);
    Ok((build_feed_reader(file, &meta), meta))
}

/// Standard input as an uncompressed UTF-8 feed.
pub fn reader_from_stdin() -> (FeedReader, FeedMeta) {
    let meta = FeedMeta {
        content_type: "application/x-ndjson".into(),
        name_hint: "<stdin>".into(),
        ..Default::default()
    };
    (build_feed_reader(tokio::io::stdin(), &meta), meta)
}
