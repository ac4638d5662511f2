use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::builder::WrapperContext;
use crate::credentials::{BINANCE_API_KEY, BINANCE_API_SECRET};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::providers::{
    exchange_currency, fetch_json, parse_decimal, require_positive_price, FromContext,
};
use crate::unified_from_millis;
use crate::wrapper::{distinct_assets, order_like_request, MarketWrapper, SourceError, Wrapper};
use crate::{HistoricalCandle, ProductQuote, Ticker};

const BASE_URL: &str = "https://api.binance.com/api/v3";
const MAX_KLINES: usize = 1_000;

/// Binance spot market data.
///
/// Binance books are quoted in stablecoins, so a `USD` configuration pairs
/// against `USDT` and the returned quotes carry `USDT` as their currency.
pub struct BinanceWrapper {
    http: Arc<dyn HttpClient>,
    auth: HttpAuth,
    currency: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    symbol: String,
    last_price: String,
    volume: String,
}

impl BinanceWrapper {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn pair(&self, asset: &Ticker) -> String {
        format!("{asset}{}", self.currency)
    }

    fn to_quote(&self, asset: &Ticker, ticker: Ticker24h) -> Result<ProductQuote, SourceError> {
        let price = parse_decimal(Self::NAME, "lastPrice", &ticker.last_price)?;
        let price = require_positive_price(Self::NAME, asset.as_str(), price)?;
        let volume = parse_decimal(Self::NAME, "volume", &ticker.volume)?;

        ProductQuote::new(
            ticker.symbol,
            asset.clone(),
            price,
            volume,
            self.currency.as_str(),
            Self::NAME,
        )
        .map_err(|error| SourceError::malformed(format!("{}: {error}", Self::NAME)))
    }
}

impl FromContext for BinanceWrapper {
    const NAME: &'static str = "BinanceWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        let api_key = context.credentials.require(BINANCE_API_KEY)?;
        context.credentials.require(BINANCE_API_SECRET)?;

        Ok(Self {
            http: Arc::clone(&context.http),
            auth: HttpAuth::Header {
                name: String::from("X-MBX-APIKEY"),
                value: api_key.to_owned(),
            },
            currency: exchange_currency(&context.currency).to_owned(),
            base_url: String::from(BASE_URL),
        })
    }
}

impl Wrapper for BinanceWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl MarketWrapper for BinanceWrapper {
    fn get_product(&self, asset_id: &Ticker) -> Result<ProductQuote, SourceError> {
        let url = format!("{}/ticker/24hr?symbol={}", self.base_url, self.pair(asset_id));
        let ticker: Ticker24h = fetch_json(
            self.http.as_ref(),
            Self::NAME,
            HttpRequest::get(url).with_auth(&self.auth),
        )?;
        self.to_quote(asset_id, ticker)
    }

    fn get_products(&self, asset_ids: &[Ticker]) -> Result<Vec<ProductQuote>, SourceError> {
        let pairs = distinct_assets(asset_ids)
            .into_iter()
            .map(|asset| format!("\"{}\"", self.pair(asset)))
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/ticker/24hr?symbols={}",
            self.base_url,
            urlencoding::encode(&format!("[{pairs}]"))
        );
        let tickers: Vec<Ticker24h> = fetch_json(
            self.http.as_ref(),
            Self::NAME,
            HttpRequest::get(url).with_auth(&self.auth),
        )?;

        let mut quotes = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let Some(asset) = asset_ids
                .iter()
                .find(|asset| self.pair(asset) == ticker.symbol)
            else {
                continue;
            };
            quotes.push(self.to_quote(asset, ticker)?);
        }
        order_like_request(Self::NAME, asset_ids, quotes)
    }

    fn get_historical_prices(
        &self,
        asset_id: &Ticker,
        limit: usize,
    ) -> Result<Vec<HistoricalCandle>, SourceError> {
        let url = format!(
            "{}/klines?symbol={}&interval=1h&limit={}",
            self.base_url,
            self.pair(asset_id),
            limit.clamp(1, MAX_KLINES)
        );
        let klines: Vec<Vec<Value>> = fetch_json(
            self.http.as_ref(),
            Self::NAME,
            HttpRequest::get(url).with_auth(&self.auth),
        )?;

        klines.iter().map(|kline| parse_kline(kline)).collect()
    }
}

/// `[open_time_ms, open, high, low, close, volume, ...]`
fn parse_kline(kline: &[Value]) -> Result<HistoricalCandle, SourceError> {
    let field = |index: usize, name: &str| -> Result<f64, SourceError> {
        match kline.get(index) {
            Some(Value::String(raw)) => parse_decimal(BinanceWrapper::NAME, name, raw),
            Some(Value::Number(number)) => number.as_f64().ok_or_else(|| {
                SourceError::malformed(format!("Binance kline field '{name}' is out of range"))
            }),
            _ => Err(SourceError::malformed(format!(
                "Binance kline is missing field '{name}'"
            ))),
        }
    };

    let open_time = kline
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| SourceError::malformed("Binance kline is missing its open time"))?;
    let timestamp = unified_from_millis(open_time)
        .map_err(|error| SourceError::malformed(format!("Binance kline open time: {error}")))?;

    HistoricalCandle::new(
        timestamp,
        field(1, "open")?,
        field(2, "high")?,
        field(3, "low")?,
        field(4, "close")?,
        field(5, "volume")?,
    )
    .map_err(|error| SourceError::malformed(format!("Binance kline: {error}")))
}
