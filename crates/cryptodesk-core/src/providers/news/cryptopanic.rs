use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::builder::WrapperContext;
use crate::credentials::{CRYPTOPANIC_API_KEY, CRYPTOPANIC_API_PLAN};
use crate::http_client::{HttpClient, HttpRequest};
use crate::providers::{clean_html, fetch_json, FromContext};
use crate::wrapper::{NewsWrapper, SourceError, Wrapper};
use crate::{Article, Ticker};

const BASE_URL: &str = "https://cryptopanic.com/api";

/// CryptoPanic subscription tier, which selects the API path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CryptoPanicPlan {
    #[default]
    Developer,
    Growth,
    Enterprise,
}

impl CryptoPanicPlan {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Developer => "developer",
            Self::Growth => "growth",
            Self::Enterprise => "enterprise",
        }
    }
}

impl Display for CryptoPanicPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoPanicPlan {
    type Err = SourceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "developer" => Ok(Self::Developer),
            "growth" => Ok(Self::Growth),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(SourceError::invalid_request(format!(
                "{CRYPTOPANIC_API_PLAN} must be developer, growth or enterprise, got '{other}'"
            ))),
        }
    }
}

/// CryptoPanic news aggregator.
pub struct CryptoPanicWrapper {
    http: Arc<dyn HttpClient>,
    api_key: String,
    plan: CryptoPanicPlan,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Posts {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    description: Option<String>,
    published_at: Option<String>,
    url: Option<String>,
    original_url: Option<String>,
    source: Option<PostSource>,
}

#[derive(Debug, Deserialize)]
struct PostSource {
    title: Option<String>,
    domain: Option<String>,
}

impl CryptoPanicWrapper {
    pub fn plan(&self) -> CryptoPanicPlan {
        self.plan
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fetch(&self, filter: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
        let url = format!(
            "{}/{}/v2/posts/?auth_token={}&kind=news&public=true{filter}",
            self.base_url, self.plan, self.api_key
        );
        let posts: Posts = fetch_json(self.http.as_ref(), Self::NAME, HttpRequest::get(url))?;

        Ok(posts
            .results
            .into_iter()
            .take(limit)
            .map(|post| Article {
                source: post
                    .source
                    .and_then(|source| source.title.or(source.domain))
                    .unwrap_or_default(),
                time: post.published_at.unwrap_or_default(),
                title: clean_html(&post.title),
                description: clean_html(&post.description.unwrap_or_default()),
                url: post.original_url.or(post.url).unwrap_or_default(),
            })
            .collect())
    }
}

impl FromContext for CryptoPanicWrapper {
    const NAME: &'static str = "CryptoPanicWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        let api_key = context.credentials.require(CRYPTOPANIC_API_KEY)?;
        let plan = match context.credentials.get(CRYPTOPANIC_API_PLAN) {
            Some(plan) => plan.parse()?,
            None => CryptoPanicPlan::default(),
        };

        Ok(Self {
            http: Arc::clone(&context.http),
            api_key: api_key.to_owned(),
            plan,
            base_url: String::from(BASE_URL),
        })
    }
}

impl Wrapper for CryptoPanicWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl NewsWrapper for CryptoPanicWrapper {
    fn get_top_headlines(&self, limit: usize) -> Result<Vec<Article>, SourceError> {
        self.fetch("&filter=hot", limit)
    }

    /// Ticker-shaped queries filter by currency; anything else is a text
    /// search.
    fn get_latest_news(&self, query: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
        let filter = match Ticker::parse(query) {
            Ok(ticker) if query.trim().len() <= 6 => format!("&currencies={ticker}"),
            _ => format!("&search={}", urlencoding::encode(query.trim())),
        };
        self.fetch(&filter, limit)
    }
}
