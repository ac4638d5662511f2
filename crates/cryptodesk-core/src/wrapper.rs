//! Wrapper capability sets and the provider-level error type.
//!
//! A wrapper adapts exactly one third-party source within one domain. Every
//! wrapper of a domain exposes the same capability set, so the handler and the
//! toolkits can treat them interchangeably.
//!
//! # Domains
//!
//! | Domain | Trait | Operations |
//! |--------|-------|------------|
//! | Market | [`MarketWrapper`] | `get_product`, `get_products`, `get_historical_prices` |
//! | News | [`NewsWrapper`] | `get_top_headlines`, `get_latest_news` |
//! | Social | [`SocialWrapper`] | `get_top_crypto_posts` |
//!
//! Wrappers never retry, never fail over and never look at other providers:
//! they either return canonical records or fail fast with a [`SourceError`].

use std::fmt::{Display, Formatter};
use std::panic::Location;

use crate::{Article, HistoricalCandle, ProductQuote, SocialPost, Ticker};

/// Default number of hourly candles requested by history calls.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    MissingCredential,
    Unavailable,
    RateLimited,
    InvalidRequest,
    Malformed,
    Internal,
}

impl SourceErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingCredential => "source.missing_credential",
            Self::Unavailable => "source.unavailable",
            Self::RateLimited => "source.rate_limited",
            Self::InvalidRequest => "source.invalid_request",
            Self::Malformed => "source.malformed_response",
            Self::Internal => "source.internal",
        }
    }
}

/// Structured provider error consumed by the handler's retry loop.
///
/// The location where the error was raised is captured automatically so the
/// handler log and the final "all wrappers failed" message can point at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    location: &'static Location<'static>,
}

impl SourceError {
    #[track_caller]
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn missing_credential(variable: &str) -> Self {
        Self::new(
            SourceErrorKind::MissingCredential,
            format!("environment variable '{variable}' is not set"),
        )
    }

    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    #[track_caller]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    #[track_caller]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message)
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message)
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// `file:line` of the place that raised the error.
    pub fn location(&self) -> String {
        format!("{}:{}", self.location.file(), self.location.line())
    }

    /// One-line rendition used in handler logs: code, message and origin.
    pub fn concise(&self) -> String {
        format!("{}: {} at {}", self.code(), self.message, self.location())
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Common identity of every wrapper.
///
/// The name is the wrapper's short type name (for example `BinanceWrapper`);
/// it is the key used in configuration filters and in collect-all results.
pub trait Wrapper: Send + Sync {
    fn name(&self) -> &'static str;
}

/// Market data capability set.
pub trait MarketWrapper: Wrapper {
    /// Fetches the current spot quote of one asset.
    ///
    /// # Errors
    ///
    /// Fails if the asset is unknown at this provider or the response lacks a
    /// positive price.
    fn get_product(&self, asset_id: &Ticker) -> Result<ProductQuote, SourceError>;

    /// Fetches spot quotes for several assets, ordered like `asset_ids`.
    fn get_products(&self, asset_ids: &[Ticker]) -> Result<Vec<ProductQuote>, SourceError> {
        asset_ids
            .iter()
            .map(|asset_id| self.get_product(asset_id))
            .collect()
    }

    /// Fetches up to `limit` hourly candles, most recent last.
    fn get_historical_prices(
        &self,
        asset_id: &Ticker,
        limit: usize,
    ) -> Result<Vec<HistoricalCandle>, SourceError>;
}

/// News capability set.
pub trait NewsWrapper: Wrapper {
    fn get_top_headlines(&self, limit: usize) -> Result<Vec<Article>, SourceError>;

    fn get_latest_news(&self, query: &str, limit: usize) -> Result<Vec<Article>, SourceError>;
}

/// Social feed capability set.
pub trait SocialWrapper: Wrapper {
    /// Fetches up to `limit` posts; each post keeps at most
    /// [`MAX_COMMENTS`](crate::MAX_COMMENTS) comments.
    fn get_top_crypto_posts(&self, limit: usize) -> Result<Vec<SocialPost>, SourceError>;
}

/// Requested assets with repeats removed, in first-seen order.
pub(crate) fn distinct_assets(asset_ids: &[Ticker]) -> Vec<&Ticker> {
    let mut distinct: Vec<&Ticker> = Vec::with_capacity(asset_ids.len());
    for asset_id in asset_ids {
        if !distinct.contains(&asset_id) {
            distinct.push(asset_id);
        }
    }
    distinct
}

/// Reorders quotes returned in provider order to match the requested order.
///
/// A ticker requested more than once yields one quote per request. Fails if
/// the provider omitted any requested asset.
pub(crate) fn order_like_request(
    provider: &str,
    asset_ids: &[Ticker],
    quotes: Vec<ProductQuote>,
) -> Result<Vec<ProductQuote>, SourceError> {
    asset_ids
        .iter()
        .map(|asset_id| {
            quotes
                .iter()
                .find(|quote| &quote.symbol == asset_id)
                .cloned()
                .ok_or_else(|| {
                    SourceError::invalid_request(format!(
                        "{provider} did not return a quote for '{asset_id}'"
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concise_rendition_names_code_message_and_origin() {
        let error = SourceError::malformed("missing price");
        let concise = error.concise();

        assert!(concise.starts_with("source.malformed_response: missing price at "));
        assert!(concise.contains("wrapper.rs:"));
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }

    #[test]
    fn missing_credential_mentions_variable() {
        let error = SourceError::missing_credential("NEWS_API_KEY");
        assert_eq!(error.kind(), SourceErrorKind::MissingCredential);
        assert!(error.message().contains("NEWS_API_KEY"));
    }

    #[test]
    fn reorders_quotes_to_request_order() {
        let btc = Ticker::parse("BTC").expect("ticker");
        let eth = Ticker::parse("ETH").expect("ticker");
        let quotes = vec![
            ProductQuote::new("ETHUSDT", eth.clone(), 3_000.0, 10.0, "USDT", "Test")
                .expect("quote"),
            ProductQuote::new("BTCUSDT", btc.clone(), 60_000.0, 5.0, "USDT", "Test")
                .expect("quote"),
        ];

        let ordered = order_like_request("Test", &[btc.clone(), eth.clone()], quotes)
            .expect("all assets present");
        assert_eq!(ordered[0].symbol, btc);
        assert_eq!(ordered[1].symbol, eth);
    }

    #[test]
    fn repeated_ticker_gets_a_quote_each_time() {
        let btc = Ticker::parse("BTC").expect("ticker");
        let quotes = vec![
            ProductQuote::new("BTCUSDT", btc.clone(), 60_000.0, 5.0, "USDT", "Test")
                .expect("quote"),
        ];

        let ordered = order_like_request("Test", &[btc.clone(), btc.clone()], quotes)
            .expect("repeat is served from the same quote");

        assert_eq!(ordered.len(), 2);
        assert!(ordered.iter().all(|quote| quote.symbol == btc));
    }

    #[test]
    fn distinct_assets_keep_first_seen_order() {
        let assets = ["ETH", "BTC", "ETH"]
            .iter()
            .map(|symbol| Ticker::parse(symbol).expect("ticker"))
            .collect::<Vec<_>>();

        let distinct = distinct_assets(&assets)
            .into_iter()
            .map(Ticker::as_str)
            .collect::<Vec<_>>();

        assert_eq!(distinct, vec!["ETH", "BTC"]);
    }

    #[test]
    fn reorder_fails_when_asset_missing() {
        let btc = Ticker::parse("BTC").expect("ticker");
        let sol = Ticker::parse("SOL").expect("ticker");
        let quotes = vec![
            ProductQuote::new("BTCUSDT", btc.clone(), 60_000.0, 5.0, "USDT", "Test")
                .expect("quote"),
        ];

        let error = order_like_request("Test", &[btc, sol], quotes).expect_err("SOL missing");
        assert!(error.message().contains("SOL"));
    }
}
