//! # Domain Models
//!
//! Canonical records every wrapper normalizes into.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ProductQuote`] | Spot price and 24h volume of one asset at one provider |
//! | [`HistoricalCandle`] | Hourly OHLCV bar keyed by a unified timestamp |
//! | [`Article`] | News item |
//! | [`SocialPost`] / [`SocialComment`] | Social feed entry with capped comments |
//! | [`Ticker`] | Validated bare asset ticker |
//!
//! ## Unified timestamps
//!
//! Every time-bearing record derived from an epoch value stores it as
//! `YYYY-MM-DD HH:MM` (local wall-clock). Candles from different providers
//! describe the same bar exactly when their timestamp strings are equal, which
//! is what candle aggregation groups on.

mod models;
mod symbol;
mod timestamp;

pub use models::{
    Article, HistoricalCandle, ProductQuote, SocialComment, SocialPost, MAX_COMMENTS,
};
pub use symbol::Ticker;
pub use timestamp::{format_unified, unified_from_millis, unified_from_seconds, unified_timestamp};
