use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;

use crate::builder::WrapperContext;
use crate::http_client::{HttpClient, HttpRequest};
use crate::providers::{clean_html, decode_json, fetch_text, FromContext};
use crate::unified_from_seconds;
use crate::wrapper::{NewsWrapper, SourceError, Wrapper};
use crate::Article;

const BASE_URL: &str = "https://duckduckgo.com";
const HEADLINES_QUERY: &str = "crypto";

/// DuckDuckGo news vertical. Needs no credentials.
///
/// Every search first fetches the result page to obtain the `vqd` token the
/// JSON endpoint requires.
pub struct DuckDuckGoWrapper {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NewsResults {
    #[serde(default)]
    results: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    date: Option<i64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: String,
}

impl DuckDuckGoWrapper {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
        let encoded = urlencoding::encode(query);
        let page = fetch_text(
            self.http.as_ref(),
            Self::NAME,
            HttpRequest::get(format!("{}/?q={encoded}&iar=news", self.base_url)),
        )?;
        let vqd = extract_vqd(&page).ok_or_else(|| {
            SourceError::malformed(format!("{} search page carries no vqd token", Self::NAME))
        })?;

        let url = format!(
            "{}/news.js?l=us-en&o=json&noamp=1&q={encoded}&vqd={vqd}",
            self.base_url
        );
        let body = fetch_text(self.http.as_ref(), Self::NAME, HttpRequest::get(url))?;
        let news: NewsResults = decode_json(Self::NAME, &body)?;

        Ok(news
            .results
            .into_iter()
            .take(limit)
            .map(|item| Article {
                source: item.source,
                time: item
                    .date
                    .and_then(|date| unified_from_seconds(date).ok())
                    .unwrap_or_default(),
                title: clean_html(&item.title),
                description: clean_html(&item.excerpt),
                url: item.url,
            })
            .collect())
    }
}

const VQD_PATTERN: &str = r#"vqd\s*=\s*["']?([0-9][0-9-]*)"#;

fn extract_vqd(page: &str) -> Option<String> {
    static VQD: OnceLock<Regex> = OnceLock::new();
    VQD.get_or_init(|| Regex::new(VQD_PATTERN).expect("vqd pattern compiles"))
        .captures(page)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_owned())
}

impl FromContext for DuckDuckGoWrapper {
    const NAME: &'static str = "DuckDuckGoWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        Ok(Self {
            http: Arc::clone(&context.http),
            base_url: String::from(BASE_URL),
        })
    }
}

impl Wrapper for DuckDuckGoWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl NewsWrapper for DuckDuckGoWrapper {
    fn get_top_headlines(&self, limit: usize) -> Result<Vec<Article>, SourceError> {
        self.search(HEADLINES_QUERY, limit)
    }

    fn get_latest_news(&self, query: &str, limit: usize) -> Result<Vec<Article>, SourceError> {
        self.search(query, limit)
    }
}
