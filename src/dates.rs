//! Conversions between stored ISO-8601 timestamps and the `YYYY-MM-DD`
//! values a date input works with.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

const INPUT_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Local offset from a minute count, falling back to UTC when out of range
pub fn local_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

fn parse_stored(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Timestamps without a zone are taken as UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}

/// Stored value → date input value in the local offset.
///
/// A bare `YYYY-MM-DD` passes through untouched. Anything unparseable gives
/// an empty string, the way an input shows an invalid value.
pub fn to_input_date(stored: &str, offset: FixedOffset) -> String {
    let stored = stored.trim();
    if let Ok(date) = NaiveDate::parse_from_str(stored, INPUT_FORMAT) {
        return date.format(INPUT_FORMAT).to_string();
    }
    match parse_stored(stored) {
        Some(utc) => utc.with_timezone(&offset).format(INPUT_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Date input value → ISO-8601 timestamp at UTC midnight
pub fn to_iso_date(input: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(input.trim(), INPUT_FORMAT).ok()?;
    Some(format!("{}T00:00:00.000Z", date.format(INPUT_FORMAT)))
}

/// Stored value → `DD/MM/YYYY` for tables and exports.
/// Unparseable values are shown as they are.
pub fn to_display_date(stored: &str, offset: FixedOffset) -> String {
    let input = to_input_date(stored, offset);
    match NaiveDate::parse_from_str(&input, INPUT_FORMAT) {
        Ok(date) => date.format(DISPLAY_FORMAT).to_string(),
        Err(_) => stored.to_string(),
    }
}
