use std::collections::BTreeMap;

use chrono::FixedOffset;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::catalog::{Field, FieldKind, Record, Resource};
use crate::dates;
use crate::search::stringify;

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Invalid date for field '{field}': {value}")]
    InvalidDate { field: String, value: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid option for field '{field}': {value}")]
    InvalidOption { field: String, value: String },
}

/// In-progress form state, every value held as the text an input would hold
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    resource: &'static Resource,
    values: BTreeMap<&'static str, String>,
    /// Date fields loaded from a record: the input value shown and the
    /// timestamp it came from. An untouched date is sent back verbatim.
    loaded_dates: BTreeMap<&'static str, (String, String)>,
}

impl Draft {
    /// Blank form with every declared field present
    pub fn empty(resource: &'static Resource) -> Self {
        let values = resource.fields.iter().map(|f| (f.name, String::new())).collect();
        Self {
            resource,
            values,
            loaded_dates: BTreeMap::new(),
        }
    }

    /// Form pre-populated from an existing record, dates converted to input format
    pub fn from_record(resource: &'static Resource, record: &Record, offset: FixedOffset) -> Self {
        let mut draft = Self::empty(resource);
        for field in resource.fields {
            let value = match record.get(field.name) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) if field.kind == FieldKind::Date => {
                    let input = dates::to_input_date(s, offset);
                    draft.loaded_dates.insert(field.name, (input.clone(), s.clone()));
                    input
                }
                Some(other) => stringify(other),
            };
            draft.values.insert(field.name, value);
        }
        draft
    }

    pub fn resource(&self) -> &'static Resource {
        self.resource
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), DraftError> {
        let field = self
            .resource
            .field(name)
            .ok_or_else(|| DraftError::UnknownField(name.to_string()))?;
        self.values.insert(field.name, value.into());
        Ok(())
    }

    /// Apply `field=value` pairs, as typed on the command line.
    ///
    /// Typed values for select fields must be one of the listed options.
    /// Values already on a record are never checked.
    pub fn apply_assignments<'a>(
        &mut self,
        assignments: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), DraftError> {
        for assignment in assignments {
            let (name, value) = assignment
                .split_once('=')
                .ok_or_else(|| DraftError::UnknownField(assignment.to_string()))?;
            let name = name.trim();
            if let Some(Field { kind: FieldKind::Select(options), .. }) = self.resource.field(name) {
                if !value.is_empty() && !options.contains(&value) {
                    return Err(DraftError::InvalidOption {
                        field: name.to_string(),
                        value: value.to_string(),
                    });
                }
            }
            self.set(name, value)?;
        }
        Ok(())
    }

    /// Apply values from a JSON object (e.g. piped on stdin), ignoring
    /// keys the form doesn't declare such as `_id` or timestamps.
    pub fn apply_json(&mut self, object: &Record, offset: FixedOffset) {
        for field in self.resource.fields {
            if let Some(value) = object.get(field.name) {
                let text = match value {
                    Value::Null => String::new(),
                    Value::String(s) if field.kind == FieldKind::Date => dates::to_input_date(s, offset),
                    other => stringify(other),
                };
                self.values.insert(field.name, text);
            }
        }
    }

    /// Validate and build the JSON body sent on create or update
    pub fn to_payload(&self) -> Result<Value, DraftError> {
        let missing: Vec<String> = self
            .resource
            .fields
            .iter()
            .filter(|f| f.required && self.value(f).trim().is_empty())
            .map(|f| f.name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DraftError::MissingRequired(missing));
        }

        let mut body = Map::new();
        for field in self.resource.fields {
            body.insert(field.name.to_string(), self.coerce(field)?);
        }
        Ok(Value::Object(body))
    }

    fn value(&self, field: &Field) -> &str {
        self.values.get(field.name).map(String::as_str).unwrap_or("")
    }

    fn coerce(&self, field: &Field) -> Result<Value, DraftError> {
        let raw = self.value(field);
        match field.kind {
            FieldKind::Number => Ok(parse_float(raw)
                .and_then(json_number)
                .map(Value::Number)
                .unwrap_or(Value::Null)),
            FieldKind::Date => {
                if let Some((shown, stored)) = self.loaded_dates.get(field.name) {
                    if raw == shown {
                        return Ok(Value::String(stored.clone()));
                    }
                }
                if raw.trim().is_empty() {
                    return Ok(Value::String(String::new()));
                }
                dates::to_iso_date(raw)
                    .map(Value::String)
                    .ok_or_else(|| DraftError::InvalidDate {
                        field: field.name.to_string(),
                        value: raw.to_string(),
                    })
            }
            FieldKind::Text | FieldKind::Image | FieldKind::Select(_) => {
                Ok(Value::String(raw.to_string()))
            }
        }
    }
}

/// Whole values go out as integers, so `85000` is not echoed back as `85000.0`
fn json_number(value: f64) -> Option<Number> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

/// Longest numeric prefix of the input, the way `parseFloat` reads it.
/// No bounds checking; `None` when there is no numeric prefix at all.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut best = None;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
                if let Ok(v) = s[..end].parse::<f64>() {
                    best = Some(v);
                }
            }
            b'.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                end += 1;
            }
            b'e' | b'E' if seen_digit && !seen_exp => {
                seen_exp = true;
                end += 1;
                if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
                    end += 1;
                }
            }
            _ => break,
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::dates::local_offset;
    use serde_json::json;

    fn loans() -> &'static Resource {
        catalog::find("loan-details").unwrap()
    }

    fn filled() -> Draft {
        let mut draft = Draft::empty(loans());
        draft.set("customerName", "Ravi Kumar").unwrap();
        draft.set("chassisNumber", "MA1ER2024X01").unwrap();
        draft.set("financer", "Bajaj Finance").unwrap();
        draft.set("loanAmount", "85000").unwrap();
        draft
    }

    #[test]
    fn test_empty_draft_has_every_field_blank() {
        let draft = Draft::empty(loans());
        for field in loans().fields {
            assert_eq!(draft.get(field.name), Some(""));
        }
    }

    #[test]
    fn test_required_fields_block_submission() {
        let mut draft = Draft::empty(loans());
        draft.set("customerName", "Ravi").unwrap();
        match draft.to_payload() {
            Err(DraftError::MissingRequired(fields)) => {
                assert_eq!(fields, vec!["chassisNumber", "financer", "loanAmount"]);
            }
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn test_payload_coerces_numbers_and_dates() {
        let mut draft = filled();
        draft.set("emiAmount", "3541.67 per month").unwrap();
        draft.set("tenureMonths", "abc").unwrap();
        draft.set("disbursementDate", "2024-04-01").unwrap();

        let body = draft.to_payload().unwrap();
        assert_eq!(body["loanAmount"], json!(85000));
        assert_eq!(body["loanAmount"].to_string(), "85000");
        assert_eq!(body["emiAmount"], json!(3541.67));
        assert_eq!(body["tenureMonths"], Value::Null);
        assert_eq!(body["disbursementDate"], "2024-04-01T00:00:00.000Z");
        assert_eq!(body["mobileNumber"], "");
    }

    #[test]
    fn test_unknown_field_and_bad_option() {
        let mut draft = filled();
        assert_eq!(
            draft.set("colour", "red"),
            Err(DraftError::UnknownField("colour".into()))
        );
        assert!(matches!(
            draft.apply_assignments(["status=Maybe"]),
            Err(DraftError::InvalidOption { .. })
        ));
        assert_eq!(draft.get("status"), Some(""));
        draft.apply_assignments(["status=Approved"]).unwrap();
        assert_eq!(draft.to_payload().unwrap()["status"], "Approved");
    }

    #[test]
    fn test_from_record_prepopulates_local_dates() {
        let record = json!({
            "_id": "66a1",
            "customerName": "Sunita Devi",
            "financer": "HDFC",
            "loanAmount": 120000,
            "disbursementDate": "2024-03-14T20:00:00.000Z",
            "status": null
        });
        let draft = Draft::from_record(loans(), record.as_object().unwrap(), local_offset(330));
        assert_eq!(draft.get("customerName"), Some("Sunita Devi"));
        assert_eq!(draft.get("loanAmount"), Some("120000"));
        assert_eq!(draft.get("disbursementDate"), Some("2024-03-15"));
        assert_eq!(draft.get("status"), Some(""));
        assert_eq!(draft.get("_id"), None);
    }

    fn attendance() -> &'static Resource {
        catalog::find("attendance").unwrap()
    }

    #[test]
    fn test_untouched_date_survives_west_of_utc() {
        let record = json!({
            "_id": "a1",
            "employeeName": "Ramesh",
            "date": "2024-05-01T00:00:00.000Z",
            "status": "Present"
        });
        let mut draft = Draft::from_record(attendance(), record.as_object().unwrap(), local_offset(-300));
        assert_eq!(draft.get("date"), Some("2024-04-30"));

        draft.set("remarks", "late").unwrap();
        assert_eq!(draft.to_payload().unwrap()["date"], "2024-05-01T00:00:00.000Z");

        draft.set("date", "2024-05-03").unwrap();
        assert_eq!(draft.to_payload().unwrap()["date"], "2024-05-03T00:00:00.000Z");
    }

    #[test]
    fn test_stored_select_value_passes_through() {
        let record = json!({
            "_id": "a9",
            "employeeName": "Farhan",
            "date": "2024-05-01T00:00:00.000Z",
            "status": "Work From Home"
        });
        let mut draft = Draft::from_record(attendance(), record.as_object().unwrap(), local_offset(330));
        draft.set("remarks", "client visit").unwrap();

        let body = draft.to_payload().unwrap();
        assert_eq!(body["status"], "Work From Home");
        assert_eq!(body["remarks"], "client visit");
    }

    #[test]
    fn test_assignments() {
        let mut draft = Draft::empty(loans());
        draft
            .apply_assignments(["customerName=Arif", "financer = x=y"].into_iter())
            .unwrap();
        assert_eq!(draft.get("customerName"), Some("Arif"));
        assert_eq!(draft.get("financer"), Some(" x=y"));
        assert!(draft.apply_assignments(["novalue"].into_iter()).is_err());
    }

    #[test]
    fn test_parse_float_prefixes() {
        assert_eq!(parse_float("42"), Some(42.0));
        assert_eq!(parse_float("  -3.5kg"), Some(-3.5));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("1e3x"), Some(1000.0));
        assert_eq!(parse_float("12,000"), Some(12.0));
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("-"), None);
    }
}
