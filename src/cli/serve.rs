//! CLI entry-point for serving the benchmark API.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{api, config::Settings};

/// Run the Axum server until Ctrl-C.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
    /// Bind address; the reverse proxy usually talks to localhost.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    api::serve(settings, args.host, args.port).await
}
