pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::catalog::{Record, Resource};
use crate::error::AdminError;

pub use http::HttpBackend;

/// REST operations every CRUD screen needs from its backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// GET the whole collection
    async fn list(&self, resource: &Resource) -> Result<Vec<Record>, AdminError>;

    /// POST a new record
    async fn create(&self, resource: &Resource, body: &Value) -> Result<Value, AdminError>;

    /// PUT a full replacement keyed by id
    async fn update(&self, resource: &Resource, id: &str, body: &Value) -> Result<Value, AdminError>;

    async fn delete(&self, resource: &Resource, id: &str) -> Result<(), AdminError>;
}

/// Pull the record list out of a collection response.
///
/// Accepts a bare array, `{ "data": [...] }`, or an object whose first
/// array-valued key holds the records. Non-object entries are skipped.
pub fn extract_records(body: Value) -> Result<Vec<Record>, AdminError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(inner)) => return extract_records(Value::Object(inner)),
            _ => map
                .into_iter()
                .find_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .ok_or_else(|| AdminError::Decode("response holds no record array".to_string()))?,
        },
        other => {
            return Err(AdminError::Decode(format!(
                "expected a record array, got {}",
                type_name(&other)
            )))
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect())
}

/// Append `path` below the base URL, keeping any path prefix the base
/// already carries (`https://host/v2` + `/api/x` → `https://host/v2/api/x`)
pub fn join_path(base: &Url, path: &str) -> Result<Url, AdminError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AdminError::invalid_state(format!("'{}' cannot carry a request path", base)))?
        .pop_if_empty()
        .extend(path.split('/').filter(|s| !s.is_empty()));
    Ok(url)
}

/// Best human-readable message in an error response body
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["message", "error", "msg"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str).map(str::to_string))
            .or_else(|| {
                map.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string()),
        _ if body.trim().is_empty() => "empty response".to_string(),
        _ => body.trim().to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_records_shapes() {
        let bare = extract_records(json!([{"_id": "1"}, {"_id": "2"}])).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped = extract_records(json!({"success": true, "data": [{"_id": "1"}]})).unwrap();
        assert_eq!(wrapped.len(), 1);

        let nested = extract_records(json!({"data": {"loans": [{"_id": "1"}, 5]}})).unwrap();
        assert_eq!(nested.len(), 1);

        let named = extract_records(json!({"count": 1, "invoices": [{"_id": "9"}]})).unwrap();
        assert_eq!(named[0]["_id"], "9");
    }

    #[test]
    fn test_extract_records_rejects_scalars() {
        assert!(matches!(extract_records(json!("nope")), Err(AdminError::Decode(_))));
        assert!(matches!(extract_records(json!({"ok": true})), Err(AdminError::Decode(_))));
    }

    #[test]
    fn test_join_path_keeps_base_prefix() {
        let bare = Url::parse("https://api.test").unwrap();
        assert_eq!(join_path(&bare, "/api/customers").unwrap().as_str(), "https://api.test/api/customers");

        let prefixed = Url::parse("https://api.test/v2").unwrap();
        assert_eq!(join_path(&prefixed, "/api/customers").unwrap().as_str(), "https://api.test/v2/api/customers");

        let slashed = Url::parse("https://api.test/v2/").unwrap();
        assert_eq!(join_path(&slashed, "/api/admin/login").unwrap().as_str(), "https://api.test/v2/api/admin/login");

        let opaque = Url::parse("mailto:admin@dealer.test").unwrap();
        assert!(matches!(join_path(&opaque, "/api/x"), Err(AdminError::InvalidState(_))));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"message":"Invoice exists"}"#), "Invoice exists");
        assert_eq!(error_message(r#"{"error":"bad id"}"#), "bad id");
        assert_eq!(error_message("Internal Server Error\n"), "Internal Server Error");
        assert_eq!(error_message(""), "empty response");
        assert_eq!(error_message(r#"{"error":{"message":"Upload preset must be specified"}}"#), "Upload preset must be specified");
    }
}
