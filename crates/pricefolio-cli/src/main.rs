mod cli;
mod commands;
mod error;

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use pricefolio_market::{MarketConfig, MarketData, MemoryCache, ReqwestHttpClient};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let market = MarketData::new(
        Arc::new(MemoryCache::new()),
        Arc::new(ReqwestHttpClient::new()),
        MarketConfig::from_env(),
    );

    let data = commands::run(&cli, &market).await?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&data)?
    } else {
        serde_json::to_string(&data)?
    };
    println!("{rendered}");

    Ok(())
}
