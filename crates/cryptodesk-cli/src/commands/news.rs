use cryptodesk_core::NewsToolkit;
use serde_json::Value;

use crate::cli::{HeadlinesArgs, NewsArgs};
use crate::error::CliError;

use super::Session;

pub fn headlines(args: &HeadlinesArgs, session: &Session) -> Result<Value, CliError> {
    let mut toolkit = NewsToolkit::from_config(&session.config.api, &session.context);

    if args.all {
        return Ok(serde_json::to_value(
            toolkit.get_top_headlines_aggregated(args.limit)?,
        )?);
    }
    Ok(serde_json::to_value(toolkit.get_top_headlines(args.limit)?)?)
}

pub fn search(args: &NewsArgs, session: &Session) -> Result<Value, CliError> {
    let mut toolkit = NewsToolkit::from_config(&session.config.api, &session.context);

    if args.all {
        return Ok(serde_json::to_value(
            toolkit.get_latest_news_aggregated(&args.query, args.limit)?,
        )?);
    }
    Ok(serde_json::to_value(
        toolkit.get_latest_news(&args.query, args.limit)?,
    )?)
}
