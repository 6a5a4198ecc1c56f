//! Checkout CLI

use std::io;

use anyhow::Result;
use checkout::{cli::Cli, observability};

/// Checkout CLI entry point
#[tokio::main]
pub async fn main() -> Result<()> {
    // Help, version and usage errors are rendered by clap itself
    let cli = Cli::load().unwrap_or_else(|error| error.exit());

    observability::init(&cli.logging)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    cli.command.run(&mut handle).await?;

    Ok(())
}
