mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    // Connection settings may live in a .env file next to the server's.
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.db_config();

    match &cli.command {
        Commands::Schema => commands::schema::run(&config).await?,
        Commands::Seed(args) => commands::seed::run(&config, args).await?,
    }

    Ok(())
}
