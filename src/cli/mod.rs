//! Command-line interface wiring for salary-bench.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::{config::Settings, data::hh::SearchRequest};

pub mod benchmark;
pub mod fetch;
pub mod rates;
pub mod serve;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Salary benchmark analytics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Fetch(args) => fetch::run(args, settings).await,
            Commands::Rates => rates::run(settings).await,
            Commands::Benchmark(args) => benchmark::run(args, settings).await,
            Commands::Serve(args) => serve::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download postings for a search query.
    Fetch(fetch::Args),
    /// Print current exchange rates.
    Rates,
    /// Compute salary statistics and export the table.
    Benchmark(benchmark::Args),
    /// Serve the JSON API.
    Serve(serve::Args),
}

/// Search filters shared by the commands that hit the vacancies API.
#[derive(Debug, Clone, ClapArgs)]
pub struct QueryArgs {
    /// Words to exclude from the title, space or comma separated.
    #[arg(long, default_value = "")]
    pub exclude: String,
    /// Area id, or `all` for Minsk, Moscow and Saint Petersburg.
    #[arg(long, default_value = "16")]
    pub area: String,
    /// Experience bracket id (e.g. between1And3).
    #[arg(long, default_value = "")]
    pub experience: String,
    /// Publication window in days.
    #[arg(long, default_value_t = 30)]
    pub period: u32,
}

impl QueryArgs {
    pub fn to_request(&self, include: &str) -> SearchRequest {
        SearchRequest {
            include: include.to_string(),
            exclude: self.exclude.clone(),
            area: self.area.clone(),
            experience: self.experience.clone(),
            period: self.period,
        }
    }
}
