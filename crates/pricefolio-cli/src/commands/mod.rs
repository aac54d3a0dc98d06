mod history;
mod news;
mod overview;
mod prices;

use pricefolio_market::MarketData;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli, market: &MarketData) -> Result<Value, CliError> {
    match &cli.command {
        Command::Prices(args) => prices::run(args, market).await,
        Command::History(args) => history::run(args, market).await,
        Command::News(args) => news::run(args, market).await,
        Command::Overview(args) => overview::run(args, market).await,
    }
}
