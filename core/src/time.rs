//! Time related utils.

use chrono::Utc;

/// DateTime in UTC, the only timezone signers ever deal with.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a new DateTime from the current time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO8601 basic format: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse an ISO8601 basic format timestamp such as `20220313T072004Z`.
pub fn parse_iso8601(s: &str) -> crate::Result<DateTime> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%SZ")
        .map(|v| v.and_utc())
        .map_err(|e| {
            crate::Error::unexpected(format!("parse '{s}' into iso8601 failed"))
                .with_source(anyhow::Error::from(e))
        })
}
