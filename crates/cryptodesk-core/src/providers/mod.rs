//! Concrete wrappers and their catalogs.
//!
//! | Domain | Default order |
//! |--------|---------------|
//! | Market | Binance, YFinance, CoinBase, CryptoCompare |
//! | News | GoogleNews, DuckDuckGo, NewsApi, CryptoPanic |
//! | Social | Reddit, X, Chan |
//!
//! The helpers below are shared by every wrapper: status mapping, decoding
//! and text cleanup. They are `#[track_caller]` so errors point at the
//! wrapper line that issued the request.

pub mod market;
pub mod news;
pub mod social;

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::builder::{WrapperContext, WrapperFactory};
use crate::http_client::{HttpClient, HttpRequest};
use crate::wrapper::{MarketWrapper, NewsWrapper, SocialWrapper, SourceError};

pub use market::{BinanceWrapper, CoinBaseWrapper, CryptoCompareWrapper, YFinanceWrapper};
pub use news::{
    CryptoPanicPlan, CryptoPanicWrapper, DuckDuckGoWrapper, GoogleNewsWrapper, NewsApiWrapper,
};
pub use social::{ChanWrapper, CommandRunner, RedditWrapper, SystemCommandRunner, XWrapper};

/// Constructor shared by every catalogued wrapper.
pub trait FromContext: Sized {
    const NAME: &'static str;

    /// # Errors
    ///
    /// Fails when a credential or external tool the wrapper needs is missing.
    fn from_context(context: &WrapperContext) -> Result<Self, SourceError>;
}

fn build_market<T>(context: &WrapperContext) -> Result<Box<dyn MarketWrapper>, SourceError>
where
    T: MarketWrapper + FromContext + 'static,
{
    Ok(Box::new(T::from_context(context)?))
}

fn build_news<T>(context: &WrapperContext) -> Result<Box<dyn NewsWrapper>, SourceError>
where
    T: NewsWrapper + FromContext + 'static,
{
    Ok(Box::new(T::from_context(context)?))
}

fn build_social<T>(context: &WrapperContext) -> Result<Box<dyn SocialWrapper>, SourceError>
where
    T: SocialWrapper + FromContext + 'static,
{
    Ok(Box::new(T::from_context(context)?))
}

/// Every market wrapper, in default order.
pub fn market_catalog() -> Vec<WrapperFactory<dyn MarketWrapper>> {
    vec![
        WrapperFactory { name: BinanceWrapper::NAME, build: build_market::<BinanceWrapper> },
        WrapperFactory { name: YFinanceWrapper::NAME, build: build_market::<YFinanceWrapper> },
        WrapperFactory { name: CoinBaseWrapper::NAME, build: build_market::<CoinBaseWrapper> },
        WrapperFactory {
            name: CryptoCompareWrapper::NAME,
            build: build_market::<CryptoCompareWrapper>,
        },
    ]
}

/// Every news wrapper, in default order.
pub fn news_catalog() -> Vec<WrapperFactory<dyn NewsWrapper>> {
    vec![
        WrapperFactory { name: GoogleNewsWrapper::NAME, build: build_news::<GoogleNewsWrapper> },
        WrapperFactory { name: DuckDuckGoWrapper::NAME, build: build_news::<DuckDuckGoWrapper> },
        WrapperFactory { name: NewsApiWrapper::NAME, build: build_news::<NewsApiWrapper> },
        WrapperFactory { name: CryptoPanicWrapper::NAME, build: build_news::<CryptoPanicWrapper> },
    ]
}

/// Every social wrapper, in default order.
pub fn social_catalog() -> Vec<WrapperFactory<dyn SocialWrapper>> {
    vec![
        WrapperFactory { name: RedditWrapper::NAME, build: build_social::<RedditWrapper> },
        WrapperFactory { name: XWrapper::NAME, build: build_social::<XWrapper> },
        WrapperFactory { name: ChanWrapper::NAME, build: build_social::<ChanWrapper> },
    ]
}

/// Quote currencies some exchanges only list as a stablecoin.
const STABLECOIN_SUBSTITUTES: [(&str, &str); 1] = [("USD", "USDT")];

/// Currency to pair with on exchanges without fiat books.
pub(crate) fn exchange_currency(currency: &str) -> &str {
    STABLECOIN_SUBSTITUTES
        .iter()
        .find(|(fiat, _)| fiat.eq_ignore_ascii_case(currency))
        .map(|(_, stable)| *stable)
        .unwrap_or(currency)
}

/// Executes a request and returns the body of a 2xx response.
#[track_caller]
pub(crate) fn fetch_text(
    http: &dyn HttpClient,
    provider: &str,
    request: HttpRequest,
) -> Result<String, SourceError> {
    let response = match http.execute(request) {
        Ok(response) => response,
        Err(error) => {
            return Err(SourceError::unavailable(format!(
                "{provider} request failed: {error}"
            )))
        }
    };

    if response.status == 429 {
        return Err(SourceError::rate_limited(format!(
            "{provider} rate limit exceeded"
        )));
    }
    if !response.is_success() {
        return Err(SourceError::unavailable(format!(
            "{provider} returned HTTP {}: {}",
            response.status,
            excerpt(&response.body)
        )));
    }
    Ok(response.body)
}

/// Executes a request and decodes its JSON body.
#[track_caller]
pub(crate) fn fetch_json<T: DeserializeOwned>(
    http: &dyn HttpClient,
    provider: &str,
    request: HttpRequest,
) -> Result<T, SourceError> {
    let body = fetch_text(http, provider, request)?;
    decode_json(provider, &body)
}

#[track_caller]
pub(crate) fn decode_json<T: DeserializeOwned>(
    provider: &str,
    body: &str,
) -> Result<T, SourceError> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(error) => Err(SourceError::malformed(format!(
            "{provider} returned malformed JSON: {error}"
        ))),
    }
}

/// Parses a decimal sent as a string, as most exchanges do.
#[track_caller]
pub(crate) fn parse_decimal(provider: &str, field: &str, raw: &str) -> Result<f64, SourceError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SourceError::malformed(format!(
            "{provider} field '{field}' is not a number: '{raw}'"
        ))),
    }
}

#[track_caller]
pub(crate) fn require_positive_price(
    provider: &str,
    asset: &str,
    price: f64,
) -> Result<f64, SourceError> {
    if price > 0.0 && price.is_finite() {
        Ok(price)
    } else {
        Err(SourceError::malformed(format!(
            "{provider} returned a non-positive price for '{asset}'"
        )))
    }
}

/// Keeps the last `limit` items, which are the most recent ones for
/// chronologically sorted data.
pub(crate) fn keep_last<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    if items.len() > limit {
        items.drain(..items.len() - limit);
    }
    items
}

const BREAK_PATTERN: &str = r"(?i)<br\s*/?>";
const TAG_PATTERN: &str = r"(?is)</?[a-z][^>]*>";

/// Decodes entities, strips tags and collapses whitespace.
pub(crate) fn clean_html(raw: &str) -> String {
    static BREAKS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();

    let breaks = BREAKS.get_or_init(|| Regex::new(BREAK_PATTERN).expect("break pattern compiles"));
    let tags = TAGS.get_or_init(|| Regex::new(TAG_PATTERN).expect("tag pattern compiles"));

    let spaced = breaks.replace_all(raw, " ");
    let stripped = tags.replace_all(&spaced, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((index, _)) => format!("{}...", &trimmed[..index]),
        None => trimmed.to_owned(),
    }
}
