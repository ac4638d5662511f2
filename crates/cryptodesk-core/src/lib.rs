//! # Cryptodesk Core
//!
//! Multi-provider data access layer for crypto market, news and social data.
//!
//! ## Overview
//!
//! A caller issues one logical request ("current BTC price") and the crate
//! dispatches it over a ranked list of third-party providers:
//!
//! - **Canonical models** every provider normalizes into
//! - **Wrappers**, one per provider, behind a per-domain capability trait
//! - **Fan-out handler** with per-wrapper retries, sticky failover and a
//!   collect-all mode
//! - **Toolkits** exposing pass-through and aggregated operations
//! - **Aggregation** of quotes (VWAP) and candles (per-bar means)
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aggregator`] | Cross-provider folding of quotes and candles |
//! | [`builder`] | Handler composition from wrapper catalogs |
//! | [`config`] | TOML configuration |
//! | [`credentials`] | Provider credential record |
//! | [`domain`] | Canonical models and unified timestamps |
//! | [`error`] | Core error types |
//! | [`handler`] | Retry/failover executor and provider-keyed results |
//! | [`http_client`] | Blocking HTTP transport abstraction |
//! | [`providers`] | Concrete wrappers and catalogs |
//! | [`retry`] | Retry policy |
//! | [`toolkit`] | Market, news and social facades |
//! | [`wrapper`] | Capability traits and the wrapper error type |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cryptodesk_core::{AppConfig, MarketToolkit, WrapperContext};
//!
//! # fn main() -> Result<(), cryptodesk_core::CoreError> {
//! let config = AppConfig::default();
//! let context = WrapperContext::from_env(config.api.currency.as_str());
//! let mut market = MarketToolkit::from_config(&config.api, &context);
//!
//! let quote = market.get_product("BTC")?;
//! println!("{} {} via {}", quote.symbol, quote.price, quote.provider);
//!
//! let consensus = market.get_products_aggregated(&["BTC", "ETH"])?;
//! println!("{consensus:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Agent    │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Toolkit        │────▶│ Aggregator       │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ WrapperHandler  │────▶│ RetryPolicy      │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Wrappers        │────▶│ HTTP Client      │
//! │ (domain traits) │     │ (reqwest/fixture)│
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Domain Models   │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Wrappers fail with [`SourceError`]; the handler retries and fails over on
//! it. Toolkits surface [`CoreError`], which is either a caller mistake
//! ([`ValidationError`], never retried) or a collective failure:
//!
//! ```rust
//! use cryptodesk_core::{CoreError, SourceErrorKind};
//!
//! fn explain(error: &CoreError) -> &'static str {
//!     match error.last_source_error().map(|last| last.kind()) {
//!         Some(SourceErrorKind::RateLimited) => "slow down",
//!         Some(SourceErrorKind::MissingCredential) => "configure credentials",
//!         Some(_) => "providers unavailable",
//!         None => "check the request",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Credentials are captured once into [`Credentials`], whose `Debug` output
//!   lists variable names only
//! - Inputs are validated before any provider is contacted

pub mod aggregator;
pub mod builder;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod handler;
pub mod http_client;
pub mod providers;
pub mod retry;
pub mod toolkit;
pub mod wrapper;

// Aggregation
pub use aggregator::{aggregate_candles, aggregate_multi_assets, aggregate_single_asset};

// Handler composition
pub use builder::{HandlerBuilder, WrapperContext, WrapperFactory};

// Configuration and credentials
pub use config::{ApiConfig, AppConfig};
pub use credentials::Credentials;

// Domain models
pub use domain::{
    format_unified, unified_from_millis, unified_from_seconds, unified_timestamp, Article,
    HistoricalCandle, ProductQuote, SocialComment, SocialPost, Ticker, MAX_COMMENTS,
};

// Error types
pub use error::{CoreError, ValidationError};

// Handler
pub use handler::{ProviderResults, WrapperHandler};

// HTTP client types
pub use http_client::{
    FixtureHttpClient, HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Provider catalogs
pub use providers::{market_catalog, news_catalog, social_catalog};

// Retry logic
pub use retry::RetryPolicy;

// Toolkits
pub use toolkit::{MarketToolkit, NewsToolkit, SocialToolkit};

// Wrapper contracts
pub use wrapper::{
    MarketWrapper, NewsWrapper, SocialWrapper, SourceError, SourceErrorKind, Wrapper,
    DEFAULT_HISTORY_LIMIT,
};
