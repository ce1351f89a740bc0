//! CLI entry-point for running the salary benchmark.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    benchmark::{self, stats::StatisticsSummary, table, BenchmarkOutcome},
    config::Settings,
    data::{hh::VacancyClient, posting::Posting, rates::RateClient},
};

use super::QueryArgs;

/// Args for the `benchmark` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Postings file written by `fetch`.
    #[arg(long, conflicts_with = "include", required_unless_present = "include")]
    pub input: Option<PathBuf>,
    /// Vacancy title to search for live.
    #[arg(long)]
    pub include: Option<String>,
    #[command(flatten)]
    pub query: QueryArgs,
    /// CSV destination, defaults to `<outputs>/benchmark.csv`.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let postings = match (&args.input, &args.include) {
        (Some(path), _) => load_postings(path)?,
        (None, Some(include)) => {
            let query = args.query.to_request(include).into_query()?;
            VacancyClient::new(&settings)?.fetch(&query).await?
        }
        (None, None) => anyhow::bail!("either --input or --include is required"),
    };

    let rates = RateClient::new(&settings)?.load().await;
    let outcome = benchmark::run(postings, &rates, &settings.pipeline_config())?;
    print_outcome(&outcome);

    let rows = table::to_table_rows(outcome.kept());
    let output = args
        .output
        .unwrap_or_else(|| settings.join_output("benchmark.csv"));
    table::write_csv_file(&rows, &output)?;
    info!(path = %output.display(), "benchmark complete");
    Ok(())
}

fn load_postings(path: &Path) -> Result<Vec<Posting>> {
    let file = File::open(path).with_context(|| format!("open {path:?}"))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parse {path:?}"))
}

fn print_outcome(outcome: &BenchmarkOutcome) {
    let filter = outcome.filter();
    println!(
        "{} postings, {} kept ({} without salary, {} unconvertible, {} below floor, {} outside fence)",
        filter.total_in,
        filter.total_kept(),
        filter.without_value,
        outcome.unconvertible(),
        filter.below_floor,
        filter.outside_fence,
    );
    let Some(report) = outcome.report() else {
        println!("no usable salary survived filtering");
        return;
    };
    print_summary("gross", &report.gross);
    print_summary("net", &report.net);
    for bin in &report.gross_histogram.bins {
        println!("  {:>8.0} – {:>8.0}  {}", bin.lower, bin.upper, bin.count);
    }
}

fn print_summary(label: &str, summary: &StatisticsSummary) {
    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.0}"));
    println!(
        "{label:>5}: n={} min={} max={} mean={} median={} BYN",
        summary.count,
        fmt(summary.min),
        fmt(summary.max),
        fmt(summary.mean),
        fmt(summary.median),
    );
}
