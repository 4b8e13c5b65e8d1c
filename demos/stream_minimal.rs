use feed_stats::{reader_from_path, RecordSource, REQUIRED_FIELDS};
use futures::TryStreamExt;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = Path::new("./data/people.ndjson.gz");
    let (reader, _meta) = reader_from_path(path).await?;

    // Walk the feed lazily instead of materializing it
    let mut records = Box::pin(RecordSource::from_reader(reader).records());
    let mut missing = 0usize;
    while let Some(record) = records.try_next().await? {
        if REQUIRED_FIELDS.iter().any(|f| record.get(f).is_none()) {
            missing += 1;
        }
    }
    println!("records missing a required field: {missing}");
    Ok(())
}
