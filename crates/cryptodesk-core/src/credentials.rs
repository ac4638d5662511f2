//! Provider credentials handed to wrapper constructors.
//!
//! Credentials are captured once into an explicit record instead of being
//! read ad hoc by every wrapper. A missing variable only disables the wrapper
//! that needs it.
//!
//! | Provider | Variables |
//! |----------|-----------|
//! | Binance | `BINANCE_API_KEY`, `BINANCE_API_SECRET` |
//! | Coinbase | `COINBASE_API_KEY`, `COINBASE_API_SECRET` |
//! | CryptoCompare | `CRYPTOCOMPARE_API_KEY` |
//! | NewsAPI | `NEWS_API_KEY` |
//! | CryptoPanic | `CRYPTOPANIC_API_KEY`, optional `CRYPTOPANIC_API_PLAN` |
//! | Reddit | `REDDIT_API_CLIENT_ID`, `REDDIT_API_CLIENT_SECRET` |
//! | X | `X_API_KEY` (plus the `rettiwt` CLI on `PATH`) |

use std::collections::BTreeMap;
use std::env;
use std::fmt::{Debug, Formatter};

use crate::wrapper::SourceError;

pub const BINANCE_API_KEY: &str = "BINANCE_API_KEY";
pub const BINANCE_API_SECRET: &str = "BINANCE_API_SECRET";
pub const COINBASE_API_KEY: &str = "COINBASE_API_KEY";
pub const COINBASE_API_SECRET: &str = "COINBASE_API_SECRET";
pub const CRYPTOCOMPARE_API_KEY: &str = "CRYPTOCOMPARE_API_KEY";
pub const NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const CRYPTOPANIC_API_KEY: &str = "CRYPTOPANIC_API_KEY";
pub const CRYPTOPANIC_API_PLAN: &str = "CRYPTOPANIC_API_PLAN";
pub const REDDIT_API_CLIENT_ID: &str = "REDDIT_API_CLIENT_ID";
pub const REDDIT_API_CLIENT_SECRET: &str = "REDDIT_API_CLIENT_SECRET";
pub const X_API_KEY: &str = "X_API_KEY";

const KNOWN_VARIABLES: [&str; 11] = [
    BINANCE_API_KEY,
    BINANCE_API_SECRET,
    COINBASE_API_KEY,
    COINBASE_API_SECRET,
    CRYPTOCOMPARE_API_KEY,
    NEWS_API_KEY,
    CRYPTOPANIC_API_KEY,
    CRYPTOPANIC_API_PLAN,
    REDDIT_API_CLIENT_ID,
    REDDIT_API_CLIENT_SECRET,
    X_API_KEY,
];

/// Snapshot of the provider credential variables.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl Credentials {
    /// Reads every known credential variable from the process environment.
    /// Empty values are treated as absent.
    pub fn from_env() -> Self {
        let values = KNOWN_VARIABLES
            .iter()
            .filter_map(|name| {
                env::var(name)
                    .ok()
                    .map(|value| ((*name).to_owned(), value))
            })
            .collect::<Vec<_>>();
        Self::from_pairs(values)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.into().trim().to_owned()))
            .filter(|(_, value)| !value.is_empty())
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the value or a missing-credential error naming the variable.
    #[track_caller]
    pub fn require(&self, name: &str) -> Result<&str, SourceError> {
        match self.get(name) {
            Some(value) => Ok(value),
            None => Err(SourceError::missing_credential(name)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// Values are secrets; only the names are printed.
impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("present", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
