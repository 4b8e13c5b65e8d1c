use clap::{Arg, Command};
use feed_stats::{Friend, Person};
use std::io::{self, Write};

const NAMES: [&str; 7] = ["Ada", "Bo", "Cy", "Di", "Ed", "Flo", "Gus"];
const CITIES: [&str; 6] = ["Austin", "Boston", "Chicago", "Denver", "Oslo", "Zurich"];
const HOBBIES: [&str; 8] = [
    "chess", "golf", "hiking", "painting", "rowing", "sailing", "tennis", "yoga",
];

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .about("Write a deterministic NDJSON people feed to stdout")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(
            Arg::new("cities")
                .long("cities")
                .value_parser(clap::value_parser!(usize))
                .default_value("4"),
        )
        .arg(
            Arg::new("blank_every")
                .long("blank-every")
                .help("Emit a keep-alive blank line after every N records")
                .value_parser(clap::value_parser!(u64)),
        )
        .get_matches();

    let rows: u64 = *matches.get_one("rows").unwrap();
    let cities = (*matches.get_one::<usize>("cities").unwrap()).clamp(1, CITIES.len());
    let blank_every = matches.get_one::<u64>("blank_every").copied();

    let mut out = io::BufWriter::new(io::stdout().lock());

    for i in 0..rows {
        let n = i as usize;
        let friends = (0..n % 5)
            .map(|f| Friend {
                hobbies: (0..(n + f) % 3)
                    .map(|h| HOBBIES[(n * 7 + f * 3 + h) % HOBBIES.len()].to_string())
                    .collect(),
            })
            .collect();
        let person = Person {
            id: i.into(),
            name: NAMES[(n * 5) % NAMES.len()].to_string(),
            city: CITIES[n % cities].to_string(),
            age: 18 + (i * 13) % 60,
            friends,
        };
        serde_json::to_writer(&mut out, &person)?;
        writeln!(&mut out)?;
        if blank_every.is_some_and(|every| every > 0 && (i + 1) % every == 0) {
            writeln!(&mut out)?;
        }
        if i % 10_000 == 0 {
            out.flush()?;
        } // keep buffers moving on huge runs
    }

    out.flush()?;
    Ok(())
}
