use serde_json::Value;

use crate::catalog::Record;

/// Text form of a field value as the search box sees it
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// True when any field of the record contains `needle` (already lowercased)
fn record_matches(record: &Record, needle: &str) -> bool {
    record
        .values()
        .any(|value| stringify(value).to_lowercase().contains(needle))
}

/// Case-insensitive substring search over every field of every record.
///
/// Blank terms keep the whole list. Order is preserved, so filtering the
/// result again with the same term returns it unchanged.
pub fn filter<'a>(records: &'a [Record], term: &str) -> Vec<&'a Record> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| record_matches(record, &needle))
        .collect()
}

/// Owned variant of [`filter`] for callers that keep the result around
pub fn filter_owned(records: &[Record], term: &str) -> Vec<Record> {
    filter(records, term).into_iter().cloned().collect()
}
