// Client-side error types for backend, storage and form failures
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::draft::DraftError;
use crate::storage::StorageError;

/// Everything a CRUD module, the session or the uploader can fail with
#[derive(Debug)]
pub enum AdminError {
    // Form drafts rejected before any request is sent
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 4xx from the backend
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Client { status: u16, message: String },

    // 5xx from the backend
    Server { status: u16, message: String },

    // Network failures, timeouts, refused connections
    Transport(String),

    // Response body was not the JSON we expected
    Decode(String),

    // Local storage file could not be read or written
    Storage(String),

    // No record with that id in the current list
    UnknownRecord(String),

    // The operation does not fit the module's current state
    InvalidState(String),
}

impl AdminError {
    /// HTTP status when the error came from the backend
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AdminError::BadRequest(_) => Some(400),
            AdminError::Unauthorized(_) => Some(401),
            AdminError::NotFound(_) => Some(404),
            AdminError::Conflict(_) => Some(409),
            AdminError::Client { status, .. } => Some(*status),
            AdminError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AdminError::Validation { message, .. } => message,
            AdminError::BadRequest(msg) => msg,
            AdminError::Unauthorized(msg) => msg,
            AdminError::NotFound(msg) => msg,
            AdminError::Conflict(msg) => msg,
            AdminError::Client { message, .. } => message,
            AdminError::Server { message, .. } => message,
            AdminError::Transport(msg) => msg,
            AdminError::Decode(msg) => msg,
            AdminError::Storage(msg) => msg,
            AdminError::UnknownRecord(msg) => msg,
            AdminError::InvalidState(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Validation { .. } => "VALIDATION_ERROR",
            AdminError::BadRequest(_) => "BAD_REQUEST",
            AdminError::Unauthorized(_) => "UNAUTHORIZED",
            AdminError::NotFound(_) => "NOT_FOUND",
            AdminError::Conflict(_) => "CONFLICT",
            AdminError::Client { .. } => "CLIENT_ERROR",
            AdminError::Server { .. } => "SERVER_ERROR",
            AdminError::Transport(_) => "TRANSPORT_ERROR",
            AdminError::Decode(_) => "DECODE_ERROR",
            AdminError::Storage(_) => "STORAGE_ERROR",
            AdminError::UnknownRecord(_) => "UNKNOWN_RECORD",
            AdminError::InvalidState(_) => "INVALID_STATE",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "error_code": self.error_code(),
        });
        if let Some(status) = self.status_code() {
            body["status"] = json!(status);
        }
        if let AdminError::Validation { field_errors, .. } = self {
            body["field_errors"] = json!(field_errors);
        }
        body
    }

    /// Map a non-success HTTP response onto a variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => AdminError::BadRequest(message),
            401 | 403 => AdminError::Unauthorized(message),
            404 => AdminError::NotFound(message),
            409 => AdminError::Conflict(message),
            s if s >= 500 => AdminError::Server { status: s, message },
            s => AdminError::Client { status: s, message },
        }
    }
}

impl AdminError {
    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        AdminError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unknown_record(id: &str) -> Self {
        AdminError::UnknownRecord(format!("No record with id '{}'", id))
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        AdminError::InvalidState(message.into())
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdminError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            AdminError::from_status(status.as_u16(), err.to_string())
        } else {
            AdminError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Decode(err.to_string())
    }
}

impl From<StorageError> for AdminError {
    fn from(err: StorageError) -> Self {
        AdminError::Storage(err.to_string())
    }
}

impl From<DraftError> for AdminError {
    fn from(err: DraftError) -> Self {
        let mut field_errors = HashMap::new();
        match &err {
            DraftError::MissingRequired(fields) => {
                for field in fields {
                    field_errors.insert(field.clone(), "This field is required".to_string());
                }
            }
            DraftError::InvalidDate { field, value } => {
                field_errors.insert(field.clone(), format!("Invalid date: {}", value));
            }
            DraftError::UnknownField(field) => {
                field_errors.insert(field.clone(), "Not a field of this form".to_string());
            }
            DraftError::InvalidOption { field, value } => {
                field_errors.insert(field.clone(), format!("'{}' is not one of the allowed options", value));
            }
        }
        AdminError::validation(err.to_string(), field_errors)
    }
}

impl std::fmt::Display for AdminError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code() {
            Some(status) => write!(f, "{} (HTTP {})", self.message(), status),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for AdminError {}
