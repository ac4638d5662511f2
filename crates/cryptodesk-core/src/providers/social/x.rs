use std::env;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::builder::WrapperContext;
use crate::credentials::X_API_KEY;
use crate::providers::{decode_json, FromContext};
use crate::wrapper::{SocialWrapper, SourceError, Wrapper};
use crate::{unified_from_seconds, SocialPost};

const RETTIWT: &str = "rettiwt";
const SEARCH_HASHTAGS: &str = "crypto bitcoin";

/// Runs an external program and returns its standard output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<String, SourceError>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, SourceError> {
        let output = match Command::new(program).args(args).output() {
            Ok(output) => output,
            Err(error) => {
                return Err(SourceError::unavailable(format!(
                    "cannot start '{program}': {error}"
                )))
            }
        };

        if !output.status.success() {
            return Err(SourceError::unavailable(format!(
                "'{program}' exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// X (Twitter) search through the `rettiwt` command-line client.
pub struct XWrapper {
    runner: Arc<dyn CommandRunner>,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    list: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tweet {
    #[serde(default)]
    full_text: String,
    created_at: String,
    tweet_by: Option<Author>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Author {
    user_name: String,
}

impl XWrapper {
    /// Builds a wrapper over an explicit runner, skipping the `PATH` lookup.
    pub fn with_runner(api_key: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            api_key: api_key.into(),
        }
    }
}

fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|directory| directory.join(program))
        .find(|candidate| candidate.is_file())
}

/// Accepts both the classic `Tue Nov 14 22:13:20 +0000 2023` form and RFC 3339.
fn parse_created_at(raw: &str) -> Option<i64> {
    let classic = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
    );
    OffsetDateTime::parse(raw, &classic)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .ok()
        .map(OffsetDateTime::unix_timestamp)
}

impl FromContext for XWrapper {
    const NAME: &'static str = "XWrapper";

    fn from_context(context: &WrapperContext) -> Result<Self, SourceError> {
        let api_key = context.credentials.require(X_API_KEY)?;
        if find_on_path(RETTIWT).is_none() {
            return Err(SourceError::unavailable(format!(
                "'{RETTIWT}' was not found on PATH"
            )));
        }
        Ok(Self::with_runner(api_key, Arc::new(SystemCommandRunner)))
    }
}

impl Wrapper for XWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl SocialWrapper for XWrapper {
    fn get_top_crypto_posts(&self, limit: usize) -> Result<Vec<SocialPost>, SourceError> {
        let args = [
            "-k",
            self.api_key.as_str(),
            "tweet",
            "search",
            "--hashtags",
            SEARCH_HASHTAGS,
            "--top",
            "--count",
        ]
        .iter()
        .map(|arg| (*arg).to_owned())
        .chain(std::iter::once(limit.to_string()))
        .collect::<Vec<_>>();

        let stdout = self.runner.run(RETTIWT, &args)?;
        let page: SearchPage = decode_json(Self::NAME, &stdout)?;

        page.list
            .into_iter()
            .take(limit)
            .map(|tweet| -> Result<SocialPost, SourceError> {
                let seconds = parse_created_at(&tweet.created_at).ok_or_else(|| {
                    SourceError::malformed(format!(
                        "{} tweet date '{}' is not recognised",
                        Self::NAME,
                        tweet.created_at
                    ))
                })?;
                let time = unified_from_seconds(seconds).map_err(|error| {
                    SourceError::malformed(format!("{} tweet date: {error}", Self::NAME))
                })?;
                let title = tweet
                    .tweet_by
                    .map(|author| format!("@{}", author.user_name))
                    .unwrap_or_default();
                Ok(SocialPost::new(time, title, tweet.full_text, Vec::new()))
            })
            .collect()
    }
}
