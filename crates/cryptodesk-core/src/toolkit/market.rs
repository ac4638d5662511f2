use crate::aggregator::{aggregate_candles, aggregate_multi_assets};
use crate::builder::{HandlerBuilder, WrapperContext};
use crate::config::ApiConfig;
use crate::error::CoreError;
use crate::handler::WrapperHandler;
use crate::providers::market_catalog;
use crate::toolkit::{parse_tickers, require_limit};
use crate::wrapper::MarketWrapper;
use crate::{HistoricalCandle, ProductQuote, Ticker};

/// Market facade: first-success pass-throughs plus cross-provider
/// aggregation.
pub struct MarketToolkit {
    handler: WrapperHandler<dyn MarketWrapper>,
}

impl MarketToolkit {
    pub fn new(handler: WrapperHandler<dyn MarketWrapper>) -> Self {
        Self { handler }
    }

    /// Builds the handler from `api.market_providers` (every market wrapper
    /// when empty) and the configured retry policy.
    pub fn from_config(api: &ApiConfig, context: &WrapperContext) -> Self {
        let handler = HandlerBuilder::new(market_catalog())
            .with_filter(api.market_providers.iter().cloned())
            .with_retry(api.retry_policy())
            .build(context);
        Self::new(handler)
    }

    pub fn handler(&self) -> &WrapperHandler<dyn MarketWrapper> {
        &self.handler
    }

    pub fn providers(&self) -> Vec<&'static str> {
        self.handler.names()
    }

    pub fn get_product(&mut self, asset_id: &str) -> Result<ProductQuote, CoreError> {
        let asset = Ticker::parse(asset_id)?;
        self.handler.try_call(|wrapper| wrapper.get_product(&asset))
    }

    pub fn get_products<S: AsRef<str>>(
        &mut self,
        asset_ids: &[S],
    ) -> Result<Vec<ProductQuote>, CoreError> {
        let assets = parse_tickers(asset_ids)?;
        self.handler.try_call(|wrapper| wrapper.get_products(&assets))
    }

    pub fn get_historical_prices(
        &mut self,
        asset_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoricalCandle>, CoreError> {
        let asset = Ticker::parse(asset_id)?;
        require_limit(limit)?;
        self.handler
            .try_call(|wrapper| wrapper.get_historical_prices(&asset, limit))
    }

    /// One consensus quote per asset from every provider that answered.
    pub fn get_products_aggregated<S: AsRef<str>>(
        &self,
        asset_ids: &[S],
    ) -> Result<Vec<ProductQuote>, CoreError> {
        let assets = parse_tickers(asset_ids)?;
        let results = self
            .handler
            .try_call_all(|wrapper| wrapper.get_products(&assets))?;
        Ok(aggregate_multi_assets(&results)?)
    }

    /// Candles averaged per timestamp over every provider that answered.
    pub fn get_historical_prices_aggregated(
        &self,
        asset_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoricalCandle>, CoreError> {
        let asset = Ticker::parse(asset_id)?;
        require_limit(limit)?;
        let results = self
            .handler
            .try_call_all(|wrapper| wrapper.get_historical_prices(&asset, limit))?;
        Ok(aggregate_candles(&results))
    }
}
