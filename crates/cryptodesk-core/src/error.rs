use thiserror::Error;

use crate::wrapper::SourceError;

/// Validation and contract errors exposed by `cryptodesk-core`.
///
/// These are caller-side mistakes: they are raised before any provider is
/// contacted and are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("invalid ticker character '{ch}' at {index}; expected a bare asset ticker such as BTC")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("exactly one of milliseconds or seconds must be provided")]
    TimestampUnitAmbiguous,
    #[error("timestamp must be positive, got {value}")]
    TimestampNotPositive { value: i64 },
    #[error("timestamp {value} is out of the representable range")]
    TimestampOutOfRange { value: i64 },

    #[error("limit must be greater than zero")]
    ZeroLimit,
    #[error("query cannot be empty")]
    EmptyQuery,
    #[error("at least one asset must be requested")]
    NoAssets,

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("cannot aggregate an empty set of quotes")]
    EmptyAggregation,
    #[error("cannot aggregate quotes for different assets: expected {expected}, found {found}")]
    MixedSymbols { expected: String, found: String },
}

/// Top-level error type surfaced by the toolkits.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "All wrappers failed after {attempts} attempt(s); last error: {}",
        describe_last(.last.as_ref())
    )]
    AllWrappersFailed {
        attempts: usize,
        last: Option<SourceError>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// The last provider error seen before giving up, if any provider was tried.
    pub fn last_source_error(&self) -> Option<&SourceError> {
        match self {
            Self::AllWrappersFailed { last, .. } => last.as_ref(),
            _ => None,
        }
    }
}

fn describe_last(last: Option<&SourceError>) -> String {
    match last {
        Some(error) => error.concise(),
        None => String::from("no wrappers available"),
    }
}
