//! Reading and printing datetimes in the configured timezone.

use anyhow::{bail, Result};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a datetime given on the command line.
///
/// Accepts RFC 3339 (with offset), a naive local datetime such as
/// `2025-12-20T10:00`, or a bare date (midnight). Naive values are interpreted
/// in `tz`; local times that do not exist or occur twice because of a DST
/// transition are rejected.
pub fn parse_datetime(input: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    let Some(naive) = naive else {
        bail!(
            "Invalid datetime '{}': expected e.g. 2025-12-20T10:00 or an RFC 3339 timestamp",
            input
        );
    };

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, _) => bail!(
            "Local time {} is ambiguous in {} (DST transition); give an explicit offset",
            naive,
            tz
        ),
        LocalResult::None => bail!(
            "Local time {} does not exist in {} (DST transition)",
            naive,
            tz
        ),
    }
}

pub fn format_datetime(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}
