//! CLI entry-point for printing exchange rates.

use anyhow::Result;
use tracing::instrument;

use crate::{config::Settings, data::rates::RateClient};

#[instrument(skip(settings))]
pub async fn run(settings: Settings) -> Result<()> {
    let table = RateClient::new(&settings)?.load().await;
    println!(
        "source: {:?}, as of {}",
        table.source(),
        table.as_of().to_rfc3339()
    );
    for (code, rate) in table.rates() {
        println!("1 {code} = {rate:.4} {}", table.reference());
    }
    Ok(())
}
