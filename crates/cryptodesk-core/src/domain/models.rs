use serde::{Deserialize, Serialize};

use crate::{Ticker, ValidationError};

/// Maximum number of comments retained per social post.
pub const MAX_COMMENTS: usize = 5;

/// Canonical spot market snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuote {
    /// Provider-native identifier, such as `BTCUSDT` or `BTC-USD`.
    pub id: String,
    pub symbol: Ticker,
    pub price: f64,
    /// 24h volume in base-asset units.
    pub volume_24h: f64,
    pub currency: String,
    pub provider: String,
}

impl ProductQuote {
    pub fn new(
        id: impl Into<String>,
        symbol: Ticker,
        price: f64,
        volume_24h: f64,
        currency: impl Into<String>,
        provider: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        validate_non_negative("volume_24h", volume_24h)?;

        Ok(Self {
            id: id.into(),
            symbol,
            price,
            volume_24h,
            currency: currency.into().trim().to_ascii_uppercase(),
            provider: provider.into(),
        })
    }
}

/// OHLCV bar over one hour.
///
/// Range consistency (`low <= open, close <= high`) is not enforced at
/// construction; see [`HistoricalCandle::is_consistent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalCandle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Unified `YYYY-MM-DD HH:MM` timestamp of the bar start.
    pub timestamp: String,
}

impl HistoricalCandle {
    pub fn new(
        timestamp: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;
        validate_non_negative("volume", volume)?;

        Ok(Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp: timestamp.into(),
        })
    }

    /// Whether the bar respects `low <= min(open, close)` and
    /// `max(open, close) <= high`.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
    }
}

/// Canonical news item. `time` is kept exactly as the provider supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub source: String,
    pub time: String,
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Comment attached to a [`SocialPost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialComment {
    pub time: String,
    pub description: String,
}

/// Social post with at most [`MAX_COMMENTS`] comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SocialPostRecord")]
pub struct SocialPost {
    pub time: String,
    pub title: String,
    pub description: String,
    comments: Vec<SocialComment>,
}

impl SocialPost {
    /// Builds a post, dropping every comment past [`MAX_COMMENTS`].
    pub fn new(
        time: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        mut comments: Vec<SocialComment>,
    ) -> Self {
        comments.truncate(MAX_COMMENTS);
        Self {
            time: time.into(),
            title: title.into(),
            description: description.into(),
            comments,
        }
    }

    pub fn comments(&self) -> &[SocialComment] {
        &self.comments
    }

    pub fn into_comments(self) -> Vec<SocialComment> {
        self.comments
    }
}

#[derive(Deserialize)]
struct SocialPostRecord {
    time: String,
    title: String,
    description: String,
    #[serde(default)]
    comments: Vec<SocialComment>,
}

impl From<SocialPostRecord> for SocialPost {
    fn from(record: SocialPostRecord) -> Self {
        Self::new(record.time, record.title, record.description, record.comments)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
