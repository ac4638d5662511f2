use crate::builder::{HandlerBuilder, WrapperContext};
use crate::config::ApiConfig;
use crate::error::CoreError;
use crate::handler::{ProviderResults, WrapperHandler};
use crate::providers::news_catalog;
use crate::toolkit::{require_limit, require_query};
use crate::wrapper::NewsWrapper;
use crate::Article;

/// News facade. Aggregated variants return every provider's articles
/// unmerged.
pub struct NewsToolkit {
    handler: WrapperHandler<dyn NewsWrapper>,
}

impl NewsToolkit {
    pub fn new(handler: WrapperHandler<dyn NewsWrapper>) -> Self {
        Self { handler }
    }

    pub fn from_config(api: &ApiConfig, context: &WrapperContext) -> Self {
        let handler = HandlerBuilder::new(news_catalog())
            .with_filter(api.news_providers.iter().cloned())
            .with_retry(api.retry_policy())
            .build(context);
        Self::new(handler)
    }

    pub fn handler(&self) -> &WrapperHandler<dyn NewsWrapper> {
        &self.handler
    }

    pub fn providers(&self) -> Vec<&'static str> {
        self.handler.names()
    }

    pub fn get_top_headlines(&mut self, limit: usize) -> Result<Vec<Article>, CoreError> {
        require_limit(limit)?;
        self.handler.try_call(|wrapper| wrapper.get_top_headlines(limit))
    }

    pub fn get_latest_news(
        &mut self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Article>, CoreError> {
        let query = require_query(query)?;
        require_limit(limit)?;
        self.handler
            .try_call(|wrapper| wrapper.get_latest_news(query, limit))
    }

    pub fn get_top_headlines_aggregated(
        &self,
        limit: usize,
    ) -> Result<ProviderResults<Vec<Article>>, CoreError> {
        require_limit(limit)?;
        self.handler
            .try_call_all(|wrapper| wrapper.get_top_headlines(limit))
    }

    pub fn get_latest_news_aggregated(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<ProviderResults<Vec<Article>>, CoreError> {
        let query = require_query(query)?;
        require_limit(limit)?;
        self.handler
            .try_call_all(|wrapper| wrapper.get_latest_news(query, limit))
    }
}
