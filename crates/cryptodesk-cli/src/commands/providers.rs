use cryptodesk_core::{MarketToolkit, NewsToolkit, SocialToolkit};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

use super::Session;

#[derive(Debug, Serialize)]
struct EnabledProviders {
    market: Vec<&'static str>,
    news: Vec<&'static str>,
    social: Vec<&'static str>,
}

/// Wrappers that survived construction, in handler order.
pub fn run(session: &Session) -> Result<Value, CliError> {
    let api = &session.config.api;
    let context = &session.context;

    let enabled = EnabledProviders {
        market: MarketToolkit::from_config(api, context).providers(),
        news: NewsToolkit::from_config(api, context).providers(),
        social: SocialToolkit::from_config(api, context).providers(),
    };
    Ok(serde_json::to_value(enabled)?)
}
