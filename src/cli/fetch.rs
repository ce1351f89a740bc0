//! CLI entry-point for downloading postings.

use std::fs::File;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{config::Settings, data::hh::VacancyClient};

use super::QueryArgs;

/// Args for the `fetch` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Vacancy title to search for.
    #[arg(long)]
    pub include: String,
    #[command(flatten)]
    pub query: QueryArgs,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let query = args.query.to_request(&args.include).into_query()?;
    let client = VacancyClient::new(&settings)?;
    let postings = client.fetch(&query).await?;

    let slug: String = query
        .text
        .chars()
        .take(30)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let path = settings.join_data(format!(
        "postings/{slug}_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S")
    ));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path).with_context(|| format!("create {path:?}"))?;
    serde_json::to_writer_pretty(file, &postings).with_context(|| format!("write {path:?}"))?;
    info!(path = %path.display(), count = postings.len(), "saved postings");
    println!("{}", path.display());
    Ok(())
}
