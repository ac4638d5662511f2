use crate::builder::{HandlerBuilder, WrapperContext};
use crate::config::ApiConfig;
use crate::error::CoreError;
use crate::handler::{ProviderResults, WrapperHandler};
use crate::providers::social_catalog;
use crate::toolkit::require_limit;
use crate::wrapper::SocialWrapper;
use crate::SocialPost;

/// Social feed facade.
pub struct SocialToolkit {
    handler: WrapperHandler<dyn SocialWrapper>,
}

impl SocialToolkit {
    pub fn new(handler: WrapperHandler<dyn SocialWrapper>) -> Self {
        Self { handler }
    }

    pub fn from_config(api: &ApiConfig, context: &WrapperContext) -> Self {
        let handler = HandlerBuilder::new(social_catalog())
            .with_filter(api.social_providers.iter().cloned())
            .with_retry(api.retry_policy())
            .build(context);
        Self::new(handler)
    }

    pub fn handler(&self) -> &WrapperHandler<dyn SocialWrapper> {
        &self.handler
    }

    pub fn providers(&self) -> Vec<&'static str> {
        self.handler.names()
    }

    pub fn get_top_crypto_posts(&mut self, limit: usize) -> Result<Vec<SocialPost>, CoreError> {
        require_limit(limit)?;
        self.handler
            .try_call(|wrapper| wrapper.get_top_crypto_posts(limit))
    }

    pub fn get_top_crypto_posts_aggregated(
        &self,
        limit: usize,
    ) -> Result<ProviderResults<Vec<SocialPost>>, CoreError> {
        require_limit(limit)?;
        self.handler
            .try_call_all(|wrapper| wrapper.get_top_crypto_posts(limit))
    }
}
