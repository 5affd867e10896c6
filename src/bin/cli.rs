// src/bin/cli.rs
use clap::Parser;
use threes_check::cli::{self, Cli};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // .env first so clap's env fallbacks can see it
    dotenv::dotenv().ok();

    let args = Cli::parse();
    threes_check::log::init(args.common.verbose)?;
    cli::run(args).await
}
