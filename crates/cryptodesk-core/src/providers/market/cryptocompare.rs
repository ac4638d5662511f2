use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::builder::WrapperContext;
use crate::credentials::CRYPTOCOMPARE_API_KEY;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::providers::{fetch_json, keep_last, require_positive_price, FromContext};
use crate::unified_from_seconds;
use crate::wrapper::{distinct_assets, MarketWrapper, SourceError, Wrapper};
use crate::{HistoricalCandle, ProductQuote, Ticker};

const BASE_URL: &str = "https://min-api.cryptocompare.com/data";
const MAX_HOURS: usize = 2_000;

/// CryptoCompare aggregated index prices.
pub struct CryptoCompareWrapper {
    http: Arc<dyn HttpClient>,
    auth: HttpAuth,
    currency: String,
    base_url: String,
}

/// `RAW[from][to]` entries of `pricemultifull`.
#[derive(Debug, Deserialize)]
struct PriceMulti {
    #[serde(rename = "RAW")]
    raw: Option<HashMap<String, HashMap<String, RawPrice>>>,
    #[serde(rename = "Message", default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    #[serde(rename = "PRICE", default)]
    price: f64,
    #[serde(rename = "VOLUME24HOUR", default)]
    volume_24h: f64,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Data")]
    data: Option<HistoryData>,
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    #[serde(rename = "Data", default)]
    bars: Vec<HistoryBar>,
}

#[derive(Debug, Deserialize)]
struct HistoryBar {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volumefrom: f64,
}

impl CryptoCompareWrapper {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fetch_prices(&self, asset_ids: &[Ticker]) -> Result<Vec<ProductQuote>, SourceError> {
        let symbols = distinct_assets(asset_ids)
            .into_iter()
            .map(Ticker::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/pricemultifull?fsyms={symbols}&tsyms={}",
            self.base_url, self.currency
        );
        let response: PriceMulti = fetch_json(
            self.http.as_ref(),
            Self::NAME,
            HttpRequest::get(url).with_auth(&self.auth),
        )?;

        let Some(raw) = response.raw else {
            return Err(SourceError::invalid_request(format!(
                "{} rejected the request: {}",
                Self::NAME,
                response.message
            )));
        };

        asset_ids
            .iter()
            .map(|asset| {
                let entry = raw
                    .get(asset.as_str())
                    .and_then(|quotes| quotes.get(&self.currency))
                    .ok_or_else(|| {
                        SourceError::invalid_request(format!(
                            "{} has no {}/{} price",
                            Self::NAME,
                            asset,
                            self.currency
                        ))
                    })?;
                let price = require_positive_price(Self::NAME, asset.as_str(), entry.price)?;

                ProductQuote::new(
                    asset.as_str(),
                    asset.clone(),
                    price,
                    entry.volume_24h,
                    self.currency.as_str(),
                    Self::NAME,
                )
                .map_err(|error| SourceError::malformed(format!("{}: {error}", Self::NAME)))
            })
            .collect()
    }
}

impl FromContext for CryptoCompareWrapper {
    const NAME: &'static str = "CryptoCompareWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        let api_key = context.credentials.require(CRYPTOCOMPARE_API_KEY)?;

        Ok(Self {
            http: Arc::clone(&context.http),
            auth: HttpAuth::Header {
                name: String::from("authorization"),
                value: format!("Apikey {api_key}"),
            },
            currency: context.currency.clone(),
            base_url: String::from(BASE_URL),
        })
    }
}

impl Wrapper for CryptoCompareWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl MarketWrapper for CryptoCompareWrapper {
    fn get_product(&self, asset_id: &Ticker) -> Result<ProductQuote, SourceError> {
        let mut quotes = self.fetch_prices(std::slice::from_ref(asset_id))?;
        quotes
            .pop()
            .ok_or_else(|| SourceError::malformed(format!("{} returned no quote", Self::NAME)))
    }

    fn get_products(&self, asset_ids: &[Ticker]) -> Result<Vec<ProductQuote>, SourceError> {
        self.fetch_prices(asset_ids)
    }

    fn get_historical_prices(
        &self,
        asset_id: &Ticker,
        limit: usize,
    ) -> Result<Vec<HistoricalCandle>, SourceError> {
        let limit = limit.clamp(1, MAX_HOURS);
        // The endpoint answers with `limit + 1` bars.
        let url = format!(
            "{}/v2/histohour?fsym={asset_id}&tsym={}&limit={}",
            self.base_url,
            self.currency,
            limit.saturating_sub(1).max(1)
        );
        let response: HistoryResponse = fetch_json(
            self.http.as_ref(),
            Self::NAME,
            HttpRequest::get(url).with_auth(&self.auth),
        )?;

        if response.response.eq_ignore_ascii_case("error") {
            return Err(SourceError::invalid_request(format!(
                "{} rejected the request: {}",
                Self::NAME,
                response.message
            )));
        }
        let bars = response.data.map(|data| data.bars).unwrap_or_default();

        let candles = bars
            .into_iter()
            .map(|bar| {
                let timestamp = unified_from_seconds(bar.time).map_err(|error| {
                    SourceError::malformed(format!("{} bar time: {error}", Self::NAME))
                })?;
                HistoricalCandle::new(
                    timestamp,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volumefrom,
                )
                .map_err(|error| SourceError::malformed(format!("{} bar: {error}", Self::NAME)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keep_last(candles, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;
    use crate::http_client::FixtureHttpClient;
    use crate::wrapper::SourceErrorKind;

    fn wrapper(http: FixtureHttpClient) -> CryptoCompareWrapper {
        let context = WrapperContext::new(
            Credentials::from_pairs([(CRYPTOCOMPARE_API_KEY, "cc-key")]),
            "USD",
            Arc::new(http),
        );
        CryptoCompareWrapper::from_context(&context).expect("wrapper")
    }

    #[test]
    fn api_key_goes_into_authorization_header() {
        let http = Arc::new(FixtureHttpClient::new().route(
            "pricemultifull",
            r#"{"RAW":{"BTC":{"USD":{"PRICE":64000.0,"VOLUME24HOUR":321.0}}}}"#,
        ));
        let context = WrapperContext::new(
            Credentials::from_pairs([(CRYPTOCOMPARE_API_KEY, "cc-key")]),
            "USD",
            http.clone(),
        );
        let wrapper = CryptoCompareWrapper::from_context(&context).expect("wrapper");

        let quote = wrapper
            .get_product(&Ticker::parse("BTC").expect("ticker"))
            .expect("quote");
        assert_eq!(quote.volume_24h, 321.0);

        let requests = http.recorded_requests();
        assert_eq!(
            requests[0].headers.get("authorization").map(String::as_str),
            Some("Apikey cc-key")
        );
    }

    #[test]
    fn error_payload_is_reported() {
        let http = FixtureHttpClient::new().route(
            "pricemultifull",
            r#"{"Response":"Error","Message":"fsyms param is invalid"}"#,
        );

        let error = wrapper(http)
            .get_product(&Ticker::parse("NOPE").expect("ticker"))
            .expect_err("error payload");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(error.message().contains("fsyms param is invalid"));
    }

    #[test]
    fn history_is_trimmed_to_limit() {
        let http = FixtureHttpClient::new().route(
            "histohour",
            r#"{"Response":"Success","Data":{"Data":[
                {"time":1700000000,"open":1,"high":2,"low":0.5,"close":1.5,"volumefrom":10},
                {"time":1700003600,"open":1.5,"high":2,"low":1,"close":1.8,"volumefrom":12},
                {"time":1700007200,"open":1.8,"high":2.2,"low":1.7,"close":2.1,"volumefrom":9}
            ]}}"#,
        );

        let candles = wrapper(http)
            .get_historical_prices(&Ticker::parse("BTC").expect("ticker"), 2)
            .expect("candles");
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].close, 2.1);
    }
}
