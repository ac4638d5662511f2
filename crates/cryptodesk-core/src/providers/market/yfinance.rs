use std::sync::Arc;

use serde::Deserialize;

use crate::builder::WrapperContext;
use crate::http_client::{HttpClient, HttpRequest};
use crate::providers::{fetch_json, keep_last, require_positive_price, FromContext};
use crate::unified_from_seconds;
use crate::wrapper::{MarketWrapper, SourceError, Wrapper};
use crate::{HistoricalCandle, ProductQuote, Ticker};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart API. Needs no credentials.
pub struct YFinanceWrapper {
    http: Arc<dyn HttpClient>,
    currency: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    regular_market_price: Option<f64>,
    regular_market_volume: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl YFinanceWrapper {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chart(&self, asset: &Ticker, range: &str) -> Result<ChartResult, SourceError> {
        let url = format!(
            "{}/{asset}-{}?interval=1h&range={range}",
            self.base_url, self.currency
        );
        let envelope: ChartEnvelope =
            fetch_json(self.http.as_ref(), Self::NAME, HttpRequest::get(url))?;

        if let Some(error) = envelope.chart.error {
            return Err(SourceError::invalid_request(format!(
                "{} chart error for '{asset}': {}",
                Self::NAME,
                error.description
            )));
        }
        envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| {
                SourceError::malformed(format!(
                    "{} returned an empty chart for '{asset}'",
                    Self::NAME
                ))
            })
    }
}

/// Smallest chart range holding `limit` hourly bars of a 24/7 market.
fn range_for(limit: usize) -> &'static str {
    match limit {
        0..=96 => "5d",
        97..=720 => "1mo",
        721..=2_160 => "3mo",
        2_161..=4_380 => "6mo",
        _ => "1y",
    }
}

impl FromContext for YFinanceWrapper {
    const NAME: &'static str = "YFinanceWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        Ok(Self {
            http: Arc::clone(&context.http),
            currency: context.currency.clone(),
            base_url: String::from(BASE_URL),
        })
    }
}

impl Wrapper for YFinanceWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl MarketWrapper for YFinanceWrapper {
    fn get_product(&self, asset_id: &Ticker) -> Result<ProductQuote, SourceError> {
        let chart = self.chart(asset_id, "1d")?;
        let price = chart.meta.regular_market_price.unwrap_or_default();
        let price = require_positive_price(Self::NAME, asset_id.as_str(), price)?;

        ProductQuote::new(
            chart.meta.symbol,
            asset_id.clone(),
            price,
            chart.meta.regular_market_volume.unwrap_or_default().max(0.0),
            self.currency.as_str(),
            Self::NAME,
        )
        .map_err(|error| SourceError::malformed(format!("{}: {error}", Self::NAME)))
    }

    fn get_historical_prices(
        &self,
        asset_id: &Ticker,
        limit: usize,
    ) -> Result<Vec<HistoricalCandle>, SourceError> {
        let chart = self.chart(asset_id, range_for(limit))?;
        let series = chart.indicators.quote.into_iter().next().unwrap_or_default();

        let mut candles = Vec::with_capacity(chart.timestamp.len());
        for (index, start) in chart.timestamp.iter().enumerate() {
            let value = |values: &[Option<f64>]| values.get(index).copied().flatten();
            // The bar still forming, or a gap, comes back as nulls.
            let (Some(open), Some(high), Some(low), Some(close)) = (
                value(&series.open),
                value(&series.high),
                value(&series.low),
                value(&series.close),
            ) else {
                continue;
            };

            let timestamp = unified_from_seconds(*start).map_err(|error| {
                SourceError::malformed(format!("{} bar time: {error}", Self::NAME))
            })?;
            let volume = value(&series.volume).unwrap_or_default();
            let candle = HistoricalCandle::new(timestamp, open, high, low, close, volume)
                .map_err(|error| SourceError::malformed(format!("{} bar: {error}", Self::NAME)))?;
            candles.push(candle);
        }
        Ok(keep_last(candles, limit))
    }
}
