//! Cross-provider folding of market records.
//!
//! - quotes for one asset collapse into a single volume-weighted quote;
//! - quotes for many assets are grouped by symbol first;
//! - candles are bucketed by their unified timestamp and averaged field by
//!   field.
//!
//! No outlier or staleness filtering happens here.

use std::collections::BTreeMap;

use crate::handler::ProviderResults;
use crate::{HistoricalCandle, ProductQuote, ValidationError};

/// Provider tag used when no input quote names its provider.
pub const AGGREGATED_PROVIDER: &str = "AGGREGATED";

/// Folds quotes of a single asset into one consensus quote.
///
/// - `price` is the VWAP over inputs with positive volume, falling back to the
///   mean of positive prices when no input has volume, and to zero when no
///   input has a price either;
/// - `volume_24h` is the sum of positive volumes divided by the number of
///   inputs;
/// - `currency` is the first non-empty input currency;
/// - `provider` lists the distinct input providers in first-seen order.
///
/// # Errors
///
/// [`ValidationError::EmptyAggregation`] on empty input and
/// [`ValidationError::MixedSymbols`] when the inputs name different assets.
pub fn aggregate_single_asset<'a, I>(quotes: I) -> Result<ProductQuote, ValidationError>
where
    I: IntoIterator<Item = &'a ProductQuote>,
{
    let quotes = quotes.into_iter().collect::<Vec<_>>();
    let first = quotes.first().ok_or(ValidationError::EmptyAggregation)?;
    let symbol = first.symbol.clone();

    if let Some(other) = quotes.iter().find(|quote| quote.symbol != symbol) {
        return Err(ValidationError::MixedSymbols {
            expected: symbol.to_string(),
            found: other.symbol.to_string(),
        });
    }

    let mut weighted_sum = 0.0;
    let mut total_volume = 0.0;
    let mut positive_prices = Vec::new();
    for quote in &quotes {
        if quote.volume_24h > 0.0 {
            weighted_sum += quote.price * quote.volume_24h;
            total_volume += quote.volume_24h;
        }
        if quote.price > 0.0 {
            positive_prices.push(quote.price);
        }
    }

    let price = if total_volume > 0.0 {
        weighted_sum / total_volume
    } else if positive_prices.is_empty() {
        0.0
    } else {
        positive_prices.iter().sum::<f64>() / positive_prices.len() as f64
    };

    let currency = quotes
        .iter()
        .map(|quote| quote.currency.as_str())
        .find(|currency| !currency.is_empty())
        .unwrap_or_default();

    let mut providers: Vec<&str> = Vec::new();
    for quote in &quotes {
        let provider = quote.provider.as_str();
        if !provider.is_empty() && !providers.contains(&provider) {
            providers.push(provider);
        }
    }
    let provider = if providers.is_empty() {
        String::from(AGGREGATED_PROVIDER)
    } else {
        providers.join(",")
    };

    Ok(ProductQuote {
        id: format!("{symbol}_AGGREGATED"),
        symbol,
        price,
        volume_24h: total_volume / quotes.len() as f64,
        currency: currency.to_owned(),
        provider,
    })
}

/// Groups every provider's quotes by symbol and folds each group with
/// [`aggregate_single_asset`]. Groups come out in first-appearance order.
pub fn aggregate_multi_assets(
    results: &ProviderResults<Vec<ProductQuote>>,
) -> Result<Vec<ProductQuote>, ValidationError> {
    let mut groups: Vec<Vec<&ProductQuote>> = Vec::new();

    for quote in results.values().flatten() {
        match groups.iter_mut().find(|group| group[0].symbol == quote.symbol) {
            Some(group) => group.push(quote),
            None => groups.push(vec![quote]),
        }
    }

    groups.into_iter().map(aggregate_single_asset).collect()
}

/// Averages candles that share a timestamp across providers.
///
/// A timestamp reported by only some providers is averaged over those
/// providers. Output is sorted by timestamp.
pub fn aggregate_candles(
    results: &ProviderResults<Vec<HistoricalCandle>>,
) -> Vec<HistoricalCandle> {
    let mut buckets: BTreeMap<&str, Vec<&HistoricalCandle>> = BTreeMap::new();
    for candle in results.values().flatten() {
        buckets.entry(candle.timestamp.as_str()).or_default().push(candle);
    }

    buckets
        .into_iter()
        .map(|(timestamp, candles)| {
            let mean = |field: fn(&HistoricalCandle) -> f64| {
                candles.iter().map(|candle| field(candle)).sum::<f64>() / candles.len() as f64
            };

            HistoricalCandle {
                open: mean(|candle| candle.open),
                high: mean(|candle| candle.high),
                low: mean(|candle| candle.low),
                close: mean(|candle| candle.close),
                volume: mean(|candle| candle.volume),
                timestamp: timestamp.to_owned(),
            }
        })
        .collect()
}

impl HistoricalCandle {
    /// See [`aggregate_candles`].
    pub fn aggregate(results: &ProviderResults<Vec<HistoricalCandle>>) -> Vec<HistoricalCandle> {
        aggregate_candles(results)
    }
}
