use std::sync::Arc;

use serde::Deserialize;

use crate::builder::WrapperContext;
use crate::credentials::{REDDIT_API_CLIENT_ID, REDDIT_API_CLIENT_SECRET};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::providers::{clean_html, fetch_json, FromContext};
use crate::wrapper::{SocialWrapper, SourceError, Wrapper};
use crate::{unified_from_seconds, SocialComment, SocialPost, MAX_COMMENTS};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";
const SUBREDDITS: &str = "CryptoCurrency+Bitcoin+CryptoMarkets";
const MAX_POSTS: usize = 100;

/// Reddit top posts of the week across the main crypto subreddits.
///
/// Uses the application-only OAuth flow; a fresh token is requested on every
/// call so the wrapper holds no state.
pub struct RedditWrapper {
    http: Arc<dyn HttpClient>,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct Token {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Child<T>>,
}

#[derive(Debug, Deserialize)]
struct Child<T> {
    kind: String,
    data: T,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    created_utc: f64,
    #[serde(default)]
    stickied: bool,
}

/// `more` placeholders share the listing, so every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommentData {
    body: Option<String>,
    created_utc: Option<f64>,
}

impl RedditWrapper {
    pub fn with_urls(mut self, token_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.api_url = api_url.into();
        self
    }

    fn access_token(&self) -> Result<HttpAuth, SourceError> {
        let request = HttpRequest::post(self.token_url.as_str())
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body("grant_type=client_credentials")
            .with_auth(&HttpAuth::Basic {
                username: self.client_id.clone(),
                password: self.client_secret.clone(),
            });
        let token: Token = fetch_json(self.http.as_ref(), Self::NAME, request)?;
        Ok(HttpAuth::BearerToken(token.access_token))
    }

    fn comments(&self, auth: &HttpAuth, post_id: &str) -> Result<Vec<SocialComment>, SourceError> {
        let url = format!(
            "{}/comments/{post_id}?limit={MAX_COMMENTS}&depth=1&sort=top",
            self.api_url
        );
        let listings: Vec<Listing<CommentData>> =
            fetch_json(self.http.as_ref(), Self::NAME, HttpRequest::get(url).with_auth(auth))?;

        // The first listing is the post itself, the second its comments.
        let Some(comments) = listings.into_iter().nth(1) else {
            return Ok(Vec::new());
        };

        Ok(comments
            .data
            .children
            .into_iter()
            .filter(|child| child.kind == "t1")
            .filter_map(|child| {
                let description = clean_html(child.data.body.as_deref()?);
                let time = unified_from_seconds(child.data.created_utc? as i64).ok()?;
                (!description.is_empty()).then_some(SocialComment { time, description })
            })
            .take(MAX_COMMENTS)
            .collect())
    }
}

impl FromContext for RedditWrapper {
    const NAME: &'static str = "RedditWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        let client_id = context.credentials.require(REDDIT_API_CLIENT_ID)?;
        let client_secret = context.credentials.require(REDDIT_API_CLIENT_SECRET)?;

        Ok(Self {
            http: Arc::clone(&context.http),
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            token_url: String::from(TOKEN_URL),
            api_url: String::from(API_URL),
        })
    }
}

impl Wrapper for RedditWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl SocialWrapper for RedditWrapper {
    fn get_top_crypto_posts(&self, limit: usize) -> Result<Vec<SocialPost>, SourceError> {
        let auth = self.access_token()?;
        let url = format!(
            "{}/r/{SUBREDDITS}/top?t=week&limit={}",
            self.api_url,
            limit.clamp(1, MAX_POSTS)
        );
        let listing: Listing<PostData> =
            fetch_json(self.http.as_ref(), Self::NAME, HttpRequest::get(url).with_auth(&auth))?;

        listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .filter(|post| !post.stickied)
            .take(limit)
            .map(|post| -> Result<SocialPost, SourceError> {
                let time = unified_from_seconds(post.created_utc as i64).map_err(|error| {
                    SourceError::malformed(format!("{} post time: {error}", Self::NAME))
                })?;
                let comments = self.comments(&auth, &post.id)?;
                Ok(SocialPost::new(
                    time,
                    clean_html(&post.title),
                    clean_html(&post.selftext),
                    comments,
                ))
            })
            .collect()
    }
}
