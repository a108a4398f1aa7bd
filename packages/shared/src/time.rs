//! Time helpers.

use chrono::{DateTime, FixedOffset, Utc};

/// JST is UTC+9
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Current Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix timestamp (milliseconds) as an RFC 3339 string in JST.
///
/// Out-of-range timestamps are formatted as the Unix epoch.
pub fn millis_to_jst_rfc3339(millis: i64) -> String {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default();
    match FixedOffset::east_opt(JST_OFFSET_SECS) {
        Some(jst) => utc.with_timezone(&jst).to_rfc3339(),
        None => utc.to_rfc3339(),
    }
}
