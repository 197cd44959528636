//! regwatch CLI: monitors regulator feeds for ESG regulatory developments.
//!
//! One `regwatch run` is one pass: fetch every configured source, classify
//! and deduplicate entries, persist the collection, and send the weekly digest.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
