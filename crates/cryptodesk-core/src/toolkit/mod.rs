//! Per-domain facades over a [`WrapperHandler`](crate::WrapperHandler).
//!
//! Pass-through operations use first-success semantics; `_aggregated`
//! operations collect from every provider. Inputs are validated before any
//! provider is contacted, so a bad ticker or a zero limit is never retried.

mod market;
mod news;
mod social;

pub use market::MarketToolkit;
pub use news::NewsToolkit;
pub use social::SocialToolkit;

use crate::{Ticker, ValidationError};

pub(crate) fn parse_tickers<S: AsRef<str>>(
    asset_ids: &[S],
) -> Result<Vec<Ticker>, ValidationError> {
    if asset_ids.is_empty() {
        return Err(ValidationError::NoAssets);
    }
    asset_ids
        .iter()
        .map(|asset_id| Ticker::parse(asset_id.as_ref()))
        .collect()
}

pub(crate) fn require_limit(limit: usize) -> Result<(), ValidationError> {
    if limit == 0 {
        return Err(ValidationError::ZeroLimit);
    }
    Ok(())
}

pub(crate) fn require_query(query: &str) -> Result<&str, ValidationError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(query)
}
