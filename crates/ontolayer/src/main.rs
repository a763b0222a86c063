mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    dispatch(cli.command).await
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Classify {
            path,
            pipeline,
            pretty,
        } => cli::classify::run(&path, &pipeline, pretty).await,
        Commands::Stats { path, pipeline } => cli::stats::run(&path, &pipeline).await,
        Commands::Import { paths, pipeline } => cli::import::run(&paths, &pipeline).await,
    }
}
