use anyhow::{Context, Result};
use clap::Parser;
use csv::Writer;
use std::io;

use geomatch::{ingest, input, matcher, Coordinate, PruneMode};

#[derive(Parser, Debug)]
#[command(name = "geomatch")]
#[command(about = "Match each point in a query set to its nearest neighbor in a reference set by great-circle distance.", long_about = None)]
struct Cli {
    /// Path to the query CSV. If omitted, query points are read interactively.
    #[arg(short, long)]
    queries: Option<String>,

    /// Path to the reference CSV. If omitted, reference points are read interactively.
    #[arg(short, long)]
    references: Option<String>,

    /// Header name of the latitude column
    #[arg(long, default_value_t = String::from("lat"))]
    lat_field: String,

    /// Header name of the longitude column
    #[arg(long, default_value_t = String::from("lon"))]
    lon_field: String,

    /// Prune strategy for the latitude-sorted scan
    #[arg(short, long, default_value_t = String::from("ascending"))]
    prune: String,

    /// Output CSV (query_lat, query_lon, match_lat, match_lon). If omitted, prints matches to stdout.
    #[arg(short, long)]
    out: Option<String>,
}

fn load_set(
    path: Option<&str>,
    lat_field: &str,
    lon_field: &str,
    label: &str,
) -> Vec<Coordinate> {
    match path {
        Some(path) => {
            let outcome = ingest::read_csv_coordinates(path, lat_field, lon_field);
            let skipped = outcome.skipped_rows();
            let coords = outcome.into_coords();
            println!(
                "Loaded {} {} points from {} ({} rows skipped)",
                coords.len(),
                label,
                path,
                skipped
            );
            coords
        }
        None => {
            println!(
                "Enter {} points as 'lat,lon' one per line. Type 'done' when finished.",
                label
            );
            input::read_coordinate_lines(io::stdin().lock())
        }
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    // Set the prune mode.
    let mode = PruneMode::from(&cli.prune);

    let queries = load_set(cli.queries.as_deref(), &cli.lat_field, &cli.lon_field, "query");
    if queries.is_empty() {
        println!("No query points provided. Exiting.");
        return Ok(());
    }

    let references = load_set(
        cli.references.as_deref(),
        &cli.lat_field,
        &cli.lon_field,
        "reference",
    );
    if references.is_empty() {
        println!("No reference points provided. Exiting.");
        return Ok(());
    }

    use std::time::SystemTime;
    let now = SystemTime::now();
    let pairs = matcher::match_pairs(&queries, &references, mode);
    if let Ok(elapsed) = now.elapsed() {
        println!(
            "Matched {} queries against {} references in {:.3} ms",
            queries.len(),
            references.len(),
            elapsed.as_secs_f64() * 1000.0
        );
    }

    if let Some(out_path) = cli.out {
        let mut wtr =
            Writer::from_path(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        wtr.write_record(["query_lat", "query_lon", "match_lat", "match_lon"])?;
        for (q, matched) in &pairs {
            match matched {
                Some(m) => wtr.write_record(&[
                    q.lat().to_string(),
                    q.lon().to_string(),
                    m.lat().to_string(),
                    m.lon().to_string(),
                ])?,
                None => wtr.write_record(&[
                    q.lat().to_string(),
                    q.lon().to_string(),
                    String::new(),
                    String::new(),
                ])?,
            }
        }
        wtr.flush()?;
        println!("Wrote {} matches to {}", pairs.len(), out_path);
    } else {
        for (q, matched) in &pairs {
            match matched {
                Some(m) => println!("{} -> {}", q, m),
                None => println!("{} -> no match", q),
            }
        }
    }

    Ok(())
}
