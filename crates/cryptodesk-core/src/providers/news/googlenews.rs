use std::sync::Arc;

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::builder::WrapperContext;
use crate::http_client::{HttpClient, HttpRequest};
use crate::providers::{clean_html, fetch_text, FromContext};
use crate::wrapper::{NewsWrapper, SourceError, Wrapper};
use crate::Article;

const BASE_URL: &str = "https://news.google.com/rss";
const HEADLINES_QUERY: &str = "cryptocurrency";

/// Google News RSS search feed. Needs no credentials.
pub struct GoogleNewsWrapper {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    #[serde(rename = "$text", default)]
    name: String,
}

impl GoogleNewsWrapper {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
        let url = format!(
            "{}/search?q={}&hl=en-US&gl=US&ceid=US:en",
            self.base_url,
            urlencoding::encode(query)
        );
        let body = fetch_text(self.http.as_ref(), Self::NAME, HttpRequest::get(url))?;
        parse_feed(&body, limit)
    }
}

fn parse_feed(body: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
    let rss: Rss = from_str(body).map_err(|error| {
        SourceError::malformed(format!(
            "{} returned malformed RSS: {error}",
            GoogleNewsWrapper::NAME
        ))
    })?;

    Ok(rss
        .channel
        .items
        .into_iter()
        .take(limit)
        .map(|item| Article {
            source: item.source.map(|source| source.name).unwrap_or_default(),
            time: item.pub_date.unwrap_or_default(),
            title: clean_html(&item.title.unwrap_or_default()),
            description: clean_html(&item.description.unwrap_or_default()),
            url: item.link.unwrap_or_default(),
        })
        .collect())
}

impl FromContext for GoogleNewsWrapper {
    const NAME: &'static str = "GoogleNewsWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        Ok(Self {
            http: Arc::clone(&context.http),
            base_url: String::from(BASE_URL),
        })
    }
}

impl Wrapper for GoogleNewsWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl NewsWrapper for GoogleNewsWrapper {
    fn get_top_headlines(&self, limit: usize) -> Result<Vec<Article>, SourceError> {
        self.search(HEADLINES_QUERY, limit)
    }

    fn get_latest_news(&self, query: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
        self.search(query, limit)
    }
}
