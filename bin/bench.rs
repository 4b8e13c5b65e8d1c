use clap::{Arg, ArgAction, Command};
use crc32fast::Hasher as Crc32;
use feed_stats::{process_records, FeedLocation, RecordSource, SourceConfig, REQUIRED_FIELDS};
use futures::TryStreamExt;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("bench")
        .arg(Arg::new("path").long("path").value_parser(clap::value_parser!(PathBuf)).required(true))
        .arg(Arg::new("verify").long("verify").help("Compute a CRC32 over the canonical form of every decoded record").action(ArgAction::SetTrue))
        .arg(Arg::new("limit").long("limit").help("Stop after N records").value_parser(clap::value_parser!(u64)))
        .get_matches();

    let path = matches.get_one::<PathBuf>("path").unwrap().clone();
    let limit = matches.get_one::<u64>("limit").copied();
    let verify = matches.get_flag("verify");

    let start = Instant::now();
    let source = RecordSource::open(SourceConfig::new(FeedLocation::Path(path.clone()))).await?;
    let (records, crc) = ingest(source, limit, verify).await?;
    let ingest_secs = start.elapsed().as_secs_f64();

    let summary = process_records(&records, &REQUIRED_FIELDS)?;
    let elapsed = start.elapsed().as_secs_f64();
    let rps = (records.len() as f64) / ingest_secs;

    let crc = crc.map(|d| format!(" crc=0x{d:08x}")).unwrap_or_default();
    println!(
        "source={} records={} cities={}{crc}\ningest={:.2}s total={:.2}s records/sec={:.0}",
        path.display(),
        records.len(),
        summary.average_age_per_city.len(),
        ingest_secs,
        elapsed,
        rps
    );
    Ok(())
}

async fn ingest(
    source: RecordSource,
    limit: Option<u64>,
    verify: bool,
) -> anyhow::Result<(Vec<Value>, Option<u32>)> {
    let mut stream = Box::pin(source.records());
    let mut records = Vec::new();
    let mut crc = Crc32::new();
    while let Some(record) = stream.try_next().await? {
        if verify {
            // records separated by '\x1e' (record separator)
            if !records.is_empty() {
                crc.update(&[0x1e]);
            }
            crc.update(&serde_json::to_vec(&record)?);
        }
        records.push(record);
        if limit.is_some_and(|lim| records.len() as u64 >= lim) {
            break;
        }
    }
    Ok((records, verify.then(|| crc.finalize())))
}
