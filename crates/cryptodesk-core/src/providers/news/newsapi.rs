use std::sync::Arc;

use serde::Deserialize;

use crate::builder::WrapperContext;
use crate::credentials::NEWS_API_KEY;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::providers::{clean_html, fetch_json, FromContext};
use crate::wrapper::{NewsWrapper, SourceError, Wrapper};
use crate::Article;

const BASE_URL: &str = "https://newsapi.org/v2";
const MAX_PAGE_SIZE: usize = 100;

/// newsapi.org business headlines and full-text search.
pub struct NewsApiWrapper {
    http: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    source: Option<RawSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl NewsApiWrapper {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fetch(&self, url: String, limit: usize) -> Result<Vec<Article>, SourceError> {
        let response: Response = fetch_json(
            self.http.as_ref(),
            Self::NAME,
            HttpRequest::get(url).with_auth(&self.auth),
        )?;
        if response.status != "ok" {
            return Err(SourceError::invalid_request(format!(
                "{} answered '{}': {}",
                Self::NAME,
                response.status,
                response.message
            )));
        }

        Ok(response
            .articles
            .into_iter()
            .take(limit)
            .map(|article| Article {
                source: article
                    .source
                    .and_then(|source| source.name)
                    .unwrap_or_default(),
                time: article.published_at.unwrap_or_default(),
                title: clean_html(&article.title.unwrap_or_default()),
                description: clean_html(&article.description.unwrap_or_default()),
                url: article.url.unwrap_or_default(),
            })
            .collect())
    }
}

impl FromContext for NewsApiWrapper {
    const NAME: &'static str = "NewsApiWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        let api_key = context.credentials.require(NEWS_API_KEY)?;

        Ok(Self {
            http: Arc::clone(&context.http),
            auth: HttpAuth::Header {
                name: String::from("X-Api-Key"),
                value: api_key.to_owned(),
            },
            base_url: String::from(BASE_URL),
        })
    }
}

impl Wrapper for NewsApiWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl NewsWrapper for NewsApiWrapper {
    fn get_top_headlines(&self, limit: usize) -> Result<Vec<Article>, SourceError> {
        let url = format!(
            "{}/top-headlines?category=business&language=en&pageSize={}",
            self.base_url,
            limit.clamp(1, MAX_PAGE_SIZE)
        );
        self.fetch(url, limit)
    }

    fn get_latest_news(&self, query: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
        let url = format!(
            "{}/everything?q={}&sortBy=publishedAt&language=en&pageSize={}",
            self.base_url,
            urlencoding::encode(query),
            limit.clamp(1, MAX_PAGE_SIZE)
        );
        self.fetch(url, limit)
    }
}
