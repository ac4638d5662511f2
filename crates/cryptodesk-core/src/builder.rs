//! Handler composition from a wrapper catalog.
//!
//! A [`WrapperFactory`] pairs a wrapper's short name with its constructor.
//! [`HandlerBuilder`] instantiates the factories selected by the configured
//! filter, drops the ones that fail construction (usually a missing
//! credential) and hands the survivors, in order, to a [`WrapperHandler`].

use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tracing::{info, warn};

use crate::credentials::Credentials;
use crate::handler::WrapperHandler;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::retry::RetryPolicy;
use crate::wrapper::{SourceError, Wrapper};

/// Everything a wrapper constructor may use.
#[derive(Clone)]
pub struct WrapperContext {
    pub credentials: Credentials,
    /// Default quote currency, such as `USD`.
    pub currency: String,
    pub http: Arc<dyn HttpClient>,
}

impl WrapperContext {
    pub fn new(
        credentials: Credentials,
        currency: impl Into<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            credentials,
            currency: currency.into().trim().to_ascii_uppercase(),
            http,
        }
    }

    /// Context over the process environment and a real HTTP client.
    pub fn from_env(currency: impl Into<String>) -> Self {
        Self::new(
            Credentials::from_env(),
            currency,
            Arc::new(ReqwestHttpClient::new()),
        )
    }
}

impl Debug for WrapperContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperContext")
            .field("credentials", &self.credentials)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

/// Named wrapper constructor.
pub struct WrapperFactory<W: ?Sized> {
    pub name: &'static str,
    pub build: fn(&WrapperContext) -> Result<Box<W>, SourceError>,
}

impl<W: ?Sized> Clone for WrapperFactory<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: ?Sized> Copy for WrapperFactory<W> {}

impl<W: ?Sized> Debug for WrapperFactory<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperFactory")
            .field("name", &self.name)
            .finish()
    }
}

impl<W: ?Sized> WrapperFactory<W> {
    /// Whether `name` designates this wrapper. Matching ignores ASCII case and
    /// an optional `Wrapper` suffix, so `binance` selects `BinanceWrapper`.
    pub fn matches(&self, name: &str) -> bool {
        normalize_name(self.name) == normalize_name(name)
    }
}

/// Builds a [`WrapperHandler`] from an ordered catalog of factories.
pub struct HandlerBuilder<W: ?Sized> {
    catalog: Vec<WrapperFactory<W>>,
    filter: Vec<String>,
    retry: RetryPolicy,
}

impl<W: ?Sized + Wrapper> HandlerBuilder<W> {
    /// Starts from a catalog in its default order.
    pub fn new(catalog: Vec<WrapperFactory<W>>) -> Self {
        Self {
            catalog,
            filter: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Restricts and reorders the catalog. An empty filter keeps every
    /// wrapper in catalog order; names unknown to the catalog are ignored.
    pub fn with_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Factories that [`build`](Self::build) will try, in handler order.
    pub fn selected(&self) -> Vec<WrapperFactory<W>> {
        if self.filter.is_empty() {
            return self.catalog.clone();
        }

        let mut seen = HashSet::new();
        let mut chain = Vec::with_capacity(self.filter.len());
        for requested in &self.filter {
            if let Some(factory) = self.catalog.iter().find(|factory| factory.matches(requested)) {
                if seen.insert(factory.name) {
                    chain.push(*factory);
                }
            }
        }
        chain
    }

    /// Constructs every selected wrapper. Construction failures are logged and
    /// skipped; the handler may end up empty.
    pub fn build(&self, context: &WrapperContext) -> WrapperHandler<W> {
        let mut wrappers = Vec::new();

        for factory in self.selected() {
            match (factory.build)(context) {
                Ok(wrapper) => wrappers.push(wrapper),
                Err(error) => warn!(
                    wrapper = factory.name,
                    code = error.code(),
                    "wrapper disabled: {}",
                    error.message()
                ),
            }
        }

        let handler = WrapperHandler::new(wrappers, self.retry);
        info!(
            wrappers = ?handler.names(),
            attempts_per_wrapper = self.retry.attempts_per_wrapper(),
            "handler ready"
        );
        handler
    }
}

fn normalize_name(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    match lower.strip_suffix("wrapper") {
        Some(stripped) if !stripped.is_empty() => stripped.to_owned(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::FixtureHttpClient;

    trait Named: Wrapper {}

    struct Plain(&'static str);

    impl Wrapper for Plain {
        fn name(&self) -> &'static str {
            self.0
        }
    }

    impl Named for Plain {}

    fn alpha(_: &WrapperContext) -> Result<Box<dyn Named>, SourceError> {
        Ok(Box::new(Plain("AlphaWrapper")))
    }

    fn beta(context: &WrapperContext) -> Result<Box<dyn Named>, SourceError> {
        context.credentials.require("BETA_KEY")?;
        Ok(Box::new(Plain("BetaWrapper")))
    }

    fn gamma(_: &WrapperContext) -> Result<Box<dyn Named>, SourceError> {
        Ok(Box::new(Plain("GammaWrapper")))
    }

    fn catalog() -> Vec<WrapperFactory<dyn Named>> {
        vec![
            WrapperFactory { name: "AlphaWrapper", build: alpha },
            WrapperFactory { name: "BetaWrapper", build: beta },
            WrapperFactory { name: "GammaWrapper", build: gamma },
        ]
    }

    fn context(credentials: Credentials) -> WrapperContext {
        WrapperContext::new(credentials, "usd", Arc::new(FixtureHttpClient::new()))
    }

    #[test]
    fn empty_filter_keeps_catalog_order_and_skips_failed_construction() {
        let handler = HandlerBuilder::new(catalog()).build(&context(Credentials::default()));

        assert_eq!(handler.names(), vec!["AlphaWrapper", "GammaWrapper"]);
    }

    #[test]
    fn filter_reorders_dedupes_and_ignores_unknown_names() {
        let builder = HandlerBuilder::new(catalog()).with_filter([
            "GammaWrapper",
            "unknown",
            "beta",
            "gammawrapper",
            "AlphaWrapper",
        ]);
        let handler = builder.build(&context(Credentials::from_pairs([("BETA_KEY", "k")])));

        assert_eq!(
            handler.names(),
            vec!["GammaWrapper", "BetaWrapper", "AlphaWrapper"]
        );
    }

    #[test]
    fn filter_with_only_unknown_names_builds_empty_handler() {
        let handler = HandlerBuilder::new(catalog())
            .with_filter(["Nope"])
            .build(&context(Credentials::default()));

        assert!(handler.is_empty());
    }

    #[test]
    fn context_normalizes_currency() {
        assert_eq!(context(Credentials::default()).currency, "USD");
    }
}
