use cryptodesk_core::MarketToolkit;
use serde_json::Value;

use crate::cli::{HistoryArgs, PriceArgs};
use crate::error::CliError;

use super::Session;

pub fn price(args: &PriceArgs, session: &Session) -> Result<Value, CliError> {
    let mut toolkit = MarketToolkit::from_config(&session.config.api, &session.context);

    let quotes = if args.aggregate {
        toolkit.get_products_aggregated(&args.assets)?
    } else {
        toolkit.get_products(&args.assets)?
    };
    Ok(serde_json::to_value(quotes)?)
}

pub fn history(args: &HistoryArgs, session: &Session) -> Result<Value, CliError> {
    let mut toolkit = MarketToolkit::from_config(&session.config.api, &session.context);

    let candles = if args.aggregate {
        toolkit.get_historical_prices_aggregated(&args.asset, args.limit)?
    } else {
        toolkit.get_historical_prices(&args.asset, args.limit)?
    };
    Ok(serde_json::to_value(candles)?)
}
