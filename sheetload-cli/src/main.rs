use anyhow::Result;
use clap::Parser;

use sheetload::cli::Cli;
use sheetload::cli::commands::load::handle_load_command;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    handle_load_command(cli.load).await
}
