use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// Converts an epoch value to the unified `YYYY-MM-DD HH:MM` form in local
/// wall-clock time.
///
/// Exactly one of `ms` or `s` must be given, and it must be positive.
/// Milliseconds are truncated to whole seconds, so `unified_timestamp(Some(x),
/// None)` equals `unified_timestamp(None, Some(x / 1000))` whenever `x / 1000`
/// is itself positive. Sub-second inputs land on the epoch minute.
///
/// ```
/// use cryptodesk_core::{unified_timestamp, ValidationError};
///
/// assert!(unified_timestamp(Some(1_700_000_000_000), None).is_ok());
/// assert_eq!(
///     unified_timestamp(None, None),
///     Err(ValidationError::TimestampUnitAmbiguous)
/// );
/// ```
pub fn unified_timestamp(ms: Option<i64>, s: Option<i64>) -> Result<String, ValidationError> {
    match (ms, s) {
        (Some(ms), None) if ms <= 0 => Err(ValidationError::TimestampNotPositive { value: ms }),
        (Some(ms), None) => format_epoch(ms / 1_000, local_offset()),
        (None, Some(s)) => format_unified(s, local_offset()),
        _ => Err(ValidationError::TimestampUnitAmbiguous),
    }
}

/// Shorthand for [`unified_timestamp`] with a seconds input.
pub fn unified_from_seconds(s: i64) -> Result<String, ValidationError> {
    unified_timestamp(None, Some(s))
}

/// Shorthand for [`unified_timestamp`] with a milliseconds input.
pub fn unified_from_millis(ms: i64) -> Result<String, ValidationError> {
    unified_timestamp(Some(ms), None)
}

/// Formats whole epoch seconds at the given offset.
pub fn format_unified(seconds: i64, offset: UtcOffset) -> Result<String, ValidationError> {
    if seconds <= 0 {
        return Err(ValidationError::TimestampNotPositive { value: seconds });
    }
    format_epoch(seconds, offset)
}

fn format_epoch(seconds: i64, offset: UtcOffset) -> Result<String, ValidationError> {
    let instant = OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|_| ValidationError::TimestampOutOfRange { value: seconds })?
        .to_offset(offset);

    instant
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .map_err(|_| ValidationError::TimestampOutOfRange { value: seconds })
}

// The local offset cannot always be determined (for example in multi-threaded
// processes on some platforms); UTC is used then.
fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
