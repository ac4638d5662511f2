use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;

use crate::builder::WrapperContext;
use crate::credentials::{COINBASE_API_KEY, COINBASE_API_SECRET};
use crate::http_client::{HttpClient, HttpRequest};
use crate::providers::{fetch_json, keep_last, parse_decimal, require_positive_price, FromContext};
use crate::unified_from_seconds;
use crate::wrapper::{distinct_assets, order_like_request, MarketWrapper, SourceError, Wrapper};
use crate::{HistoricalCandle, ProductQuote, Ticker};

const BASE_URL: &str = "https://api.coinbase.com/api/v3/brokerage/market";
const MAX_CANDLES: usize = 350;
const HOUR_SECONDS: i64 = 3_600;

/// Coinbase Advanced Trade public market data, `BASE-QUOTE` products.
pub struct CoinBaseWrapper {
    http: Arc<dyn HttpClient>,
    currency: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Product {
    product_id: String,
    price: String,
    #[serde(default)]
    volume_24h: String,
}

#[derive(Debug, Deserialize)]
struct ProductList {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct CandleList {
    #[serde(default)]
    candles: Vec<Candle>,
}

#[derive(Debug, Deserialize)]
struct Candle {
    start: String,
    low: String,
    high: String,
    open: String,
    close: String,
    volume: String,
}

impl CoinBaseWrapper {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn product_id(&self, asset: &Ticker) -> String {
        format!("{asset}-{}", self.currency)
    }

    fn to_quote(&self, asset: &Ticker, product: Product) -> Result<ProductQuote, SourceError> {
        let price = parse_decimal(Self::NAME, "price", &product.price)?;
        let price = require_positive_price(Self::NAME, asset.as_str(), price)?;
        let volume = if product.volume_24h.is_empty() {
            0.0
        } else {
            parse_decimal(Self::NAME, "volume_24h", &product.volume_24h)?
        };

        ProductQuote::new(
            product.product_id,
            asset.clone(),
            price,
            volume,
            self.currency.as_str(),
            Self::NAME,
        )
        .map_err(|error| SourceError::malformed(format!("{}: {error}", Self::NAME)))
    }
}

impl FromContext for CoinBaseWrapper {
    const NAME: &'static str = "CoinBaseWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        context.credentials.require(COINBASE_API_KEY)?;
        context.credentials.require(COINBASE_API_SECRET)?;

        Ok(Self {
            http: Arc::clone(&context.http),
            currency: context.currency.clone(),
            base_url: String::from(BASE_URL),
        })
    }
}

impl Wrapper for CoinBaseWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl MarketWrapper for CoinBaseWrapper {
    fn get_product(&self, asset_id: &Ticker) -> Result<ProductQuote, SourceError> {
        let url = format!("{}/products/{}", self.base_url, self.product_id(asset_id));
        let product: Product = fetch_json(self.http.as_ref(), Self::NAME, HttpRequest::get(url))?;
        self.to_quote(asset_id, product)
    }

    fn get_products(&self, asset_ids: &[Ticker]) -> Result<Vec<ProductQuote>, SourceError> {
        let query = distinct_assets(asset_ids)
            .into_iter()
            .map(|asset| format!("product_ids={}", self.product_id(asset)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}/products?{query}", self.base_url);
        let list: ProductList = fetch_json(self.http.as_ref(), Self::NAME, HttpRequest::get(url))?;

        let mut quotes = Vec::with_capacity(list.products.len());
        for product in list.products {
            let Some(asset) = asset_ids
                .iter()
                .find(|asset| self.product_id(asset) == product.product_id)
            else {
                continue;
            };
            quotes.push(self.to_quote(asset, product)?);
        }
        order_like_request(Self::NAME, asset_ids, quotes)
    }

    fn get_historical_prices(
        &self,
        asset_id: &Ticker,
        limit: usize,
    ) -> Result<Vec<HistoricalCandle>, SourceError> {
        let limit = limit.clamp(1, MAX_CANDLES);
        let end = OffsetDateTime::now_utc().unix_timestamp();
        let start = end - HOUR_SECONDS * limit as i64;
        let url = format!(
            "{}/products/{}/candles?start={start}&end={end}&granularity=ONE_HOUR&limit={limit}",
            self.base_url,
            self.product_id(asset_id)
        );
        let list: CandleList = fetch_json(self.http.as_ref(), Self::NAME, HttpRequest::get(url))?;

        let mut candles = list
            .candles
            .iter()
            .map(parse_candle)
            .collect::<Result<Vec<_>, _>>()?;
        candles.sort_by_key(|(start, _)| *start);
        Ok(keep_last(
            candles.into_iter().map(|(_, candle)| candle).collect(),
            limit,
        ))
    }
}

fn parse_candle(candle: &Candle) -> Result<(i64, HistoricalCandle), SourceError> {
    let name = CoinBaseWrapper::NAME;
    let start = candle
        .start
        .trim()
        .parse::<i64>()
        .map_err(|_| {
            SourceError::malformed(format!("{name} candle start '{}' is invalid", candle.start))
        })?;
    let timestamp = unified_from_seconds(start)
        .map_err(|error| SourceError::malformed(format!("{name} candle start: {error}")))?;

    let bar = HistoricalCandle::new(
        timestamp,
        parse_decimal(name, "open", &candle.open)?,
        parse_decimal(name, "high", &candle.high)?,
        parse_decimal(name, "low", &candle.low)?,
        parse_decimal(name, "close", &candle.close)?,
        parse_decimal(name, "volume", &candle.volume)?,
    )
    .map_err(|error| SourceError::malformed(format!("{name} candle: {error}")))?;
    Ok((start, bar))
}
