use std::sync::Arc;

use serde::Deserialize;

use crate::builder::WrapperContext;
use crate::http_client::{HttpClient, HttpRequest};
use crate::providers::{clean_html, fetch_json, FromContext};
use crate::wrapper::{SocialWrapper, SourceError, Wrapper};
use crate::{unified_from_seconds, SocialComment, SocialPost};

const CATALOG_URL: &str = "https://a.4cdn.org/biz/catalog.json";

/// 4chan /biz/ catalog, busiest threads first. Needs no credentials.
pub struct ChanWrapper {
    http: Arc<dyn HttpClient>,
    catalog_url: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    threads: Vec<Thread>,
}

#[derive(Debug, Deserialize)]
struct Thread {
    time: i64,
    #[serde(default)]
    sticky: u8,
    #[serde(default)]
    sub: String,
    #[serde(default)]
    com: String,
    #[serde(default)]
    replies: u32,
    #[serde(default)]
    last_replies: Vec<Reply>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    time: i64,
    #[serde(default)]
    com: String,
}

impl ChanWrapper {
    pub fn with_catalog_url(mut self, catalog_url: impl Into<String>) -> Self {
        self.catalog_url = catalog_url.into();
        self
    }
}

fn to_post(thread: Thread) -> Result<SocialPost, SourceError> {
    let time = unified_from_seconds(thread.time).map_err(|error| {
        SourceError::malformed(format!("{} thread time: {error}", ChanWrapper::NAME))
    })?;
    let comments = thread
        .last_replies
        .into_iter()
        .filter_map(|reply| {
            let description = clean_html(&reply.com);
            let time = unified_from_seconds(reply.time).ok()?;
            (!description.is_empty()).then_some(SocialComment { time, description })
        })
        .collect();

    Ok(SocialPost::new(
        time,
        clean_html(&thread.sub),
        clean_html(&thread.com),
        comments,
    ))
}

impl FromContext for ChanWrapper {
    const NAME: &'static str = "ChanWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        Ok(Self {
            http: Arc::clone(&context.http),
            catalog_url: String::from(CATALOG_URL),
        })
    }
}

impl Wrapper for ChanWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl SocialWrapper for ChanWrapper {
    fn get_top_crypto_posts(&self, limit: usize) -> Result<Vec<SocialPost>, SourceError> {
        let pages: Vec<Page> = fetch_json(
            self.http.as_ref(),
            Self::NAME,
            HttpRequest::get(self.catalog_url.as_str()),
        )?;

        let mut threads = pages
            .into_iter()
            .flat_map(|page| page.threads)
            .filter(|thread| thread.sticky == 0)
            .collect::<Vec<_>>();
        threads.sort_by(|left, right| right.replies.cmp(&left.replies));

        threads.into_iter().take(limit).map(to_post).collect()
    }
}
