use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use feed_stats::{
    load_records, process_records, save_records, save_summary, FeedLocation, FeedResult,
    RecordSource, SourceConfig, DEFAULT_MAX_LINE_LENGTH, REQUIRED_FIELDS,
};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("feed-stats")
        .about("Summarize an NDJSON people feed: per-city averages and most common names and hobbies")
        .arg(Arg::new("input").long("input").short('i').default_value("-").help("Feed file (.gz/.zst ok), or - for stdin"))
        .arg(Arg::new("snapshot").long("snapshot").help("Input file is a JSON array snapshot instead of NDJSON").action(ArgAction::SetTrue))
        .arg(Arg::new("output").long("output").short('o').default_value("answer.json").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("no-save").long("no-save").help("Do not write the results file").action(ArgAction::SetTrue))
        .arg(Arg::new("quiet").long("quiet").short('q').help("Do not print the report").action(ArgAction::SetTrue))
        .arg(Arg::new("save-records").long("save-records").help("Also write the decoded records as a snapshot").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("required").long("required").help("Override the required field list").action(ArgAction::Append))
        .arg(Arg::new("max-line-length").long("max-line-length").value_parser(clap::value_parser!(usize)))
        .arg(Arg::new("log-level").long("log-level").default_value("info"))
}

/// Combinations clap cannot express on its own.
fn check_args(matches: &ArgMatches) -> Result<(), clap::Error> {
    let from_stdin = matches.get_one::<String>("input").map(String::as_str) == Some("-");
    if matches.get_flag("snapshot") && from_stdin {
        return Err(cli().error(
            ErrorKind::ArgumentConflict,
            "--snapshot needs a file given with --input; stdin is read as NDJSON only",
        ));
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let matches = cli().get_matches();
    if let Err(err) = check_args(&matches) {
        err.exit();
    }
    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    feed_stats::logging::init(log_level);

    if let Err(err) = run(&matches).await {
        eprintln!("error [{}]: {err}", err.category());
        std::process::exit(err.exit_code());
    }
}

async fn run(matches: &ArgMatches) -> FeedResult<()> {
    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or("-");
    let location = FeedLocation::from_arg(input);

    let records = match (&location, matches.get_flag("snapshot")) {
        (FeedLocation::Path(path), true) => load_records(path).await?,
        _ => {
            let max = matches
                .get_one::<usize>("max-line-length")
                .copied()
                .unwrap_or(DEFAULT_MAX_LINE_LENGTH);
            let config = SourceConfig::new(location).with_max_line_length(max);
            RecordSource::open(config).await?.collect().await?
        }
    };

    if let Some(path) = matches.get_one::<PathBuf>("save-records") {
        save_records(path, &records).await?;
    }

    let required: Vec<&str> = match matches.get_many::<String>("required") {
        Some(fields) => fields.map(String::as_str).collect(),
        None => REQUIRED_FIELDS.to_vec(),
    };
    let summary = process_records(&records, &required)?;

    if !matches.get_flag("quiet") {
        println!("{summary}");
    }
    if !matches.get_flag("no-save") {
        if let Some(path) = matches.get_one::<PathBuf>("output") {
            save_summary(path, &summary).await?;
        }
    }
    Ok(())
}
