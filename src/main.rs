//! mapshelf: command-line manager for locally installed map packages.

mod cli;
mod error;
mod logging;

use clap::Parser;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = cli::Cli::parse();
    logging::init();
    cli::run(cli).await.map_err(|e| {
        if e.is_retryable() {
            tracing::info!("This may succeed if retried");
        }
        miette::miette!("{e:?}")
    })
}
