//! # Commands Module
//!
//! All commands exposed to the frontend over the JSON-lines protocol.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (request/response, dispatch)
//! ├── document.rs ◄─── Item, discount, tax, header and status edits
//! ├── record.rs   ◄─── Stored record export/import, copy, validation
//! └── config.rs   ◄─── Configuration and currency list
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Frontend                                                               │
//! │  ────────                                                               │
//! │  {"cmd": "update_item", "args": {"id": 1, "field": "rate",             │
//! │                                  "value": "250"}}                       │
//! │         │                                                               │
//! │         │ (one line on stdin)                                           │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  dispatch(&request, &doc, &config)                                      │
//! │     └─► document::update_item(&doc, ItemEditArgs { .. })                │
//! │            -> Result<DocumentView, ApiError>                            │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  stdout: {"ok": {"document": {...}, "breakdown": {...}}}                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the document
//! fn add_item(doc: &DocumentState) -> DocumentView
//!
//! // Only needs config
//! fn get_config(config: &ConfigState) -> ConfigState
//!
//! // Needs both
//! fn new_document(doc: &DocumentState, config: &ConfigState, args: NewDocumentArgs)
//! ```

pub mod config;
pub mod document;
pub mod record;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::{ConfigState, DocumentState};

/// One request line.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub cmd: String,
    #[serde(default)]
    pub args: Value,
}

/// One response line: `{"ok": ...}` or `{"error": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Ok(Value),
    Error(ApiError),
}

impl From<Result<Value, ApiError>> for Response {
    fn from(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(value) => Response::Ok(value),
            Err(err) => Response::Error(err),
        }
    }
}

/// Deserializes command arguments; a missing `args` reads as `{}`.
fn args<T: DeserializeOwned>(value: &Value) -> Result<T, ApiError> {
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value.clone()
    };
    Ok(serde_json::from_value(value)?)
}

fn json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Routes a request to its command.
pub fn dispatch(
    request: &Request,
    doc: &DocumentState,
    config: &ConfigState,
) -> Result<Value, ApiError> {
    let a = &request.args;

    match request.cmd.as_str() {
        // Document
        "get_document" => json(document::get_document(doc)),
        "new_document" => json(document::new_document(doc, config, args(a)?)?),
        "add_item" => json(document::add_item(doc)),
        "update_item" => json(document::update_item(doc, args(a)?)?),
        "update_item_tax" => json(document::update_item_tax(doc, args(a)?)?),
        "remove_item" => json(document::remove_item(doc, args(a)?)),
        "set_discount" => json(document::set_discount(doc, args(a)?)?),
        "toggle_discount" => json(document::toggle_discount(doc)),
        "set_tax_config" => json(document::set_tax_config(doc, args(a)?)),
        "set_currency" => json(document::set_currency(doc, args(a)?)?),
        "update_header" => json(document::update_header(doc, args(a)?)?),
        "add_custom_field" => json(document::add_custom_field(doc)),
        "update_custom_field" => json(document::update_custom_field(doc, args(a)?)?),
        "remove_custom_field" => json(document::remove_custom_field(doc, args(a)?)?),
        "mark_sent" => json(document::mark_sent(doc)?),
        "mark_paid" => json(document::mark_paid(doc)?),

        // Records
        "export_record" => json(record::export_record(doc)),
        "load_record" => json(record::load_record(doc, args(a)?)),
        "copy_record" => json(record::copy_record(doc, args(a)?)),
        "duplicate_document" => json(record::duplicate_document(doc)),
        "validate" => json(record::validate(doc)),

        // Config
        "get_config" => json(config::get_config(config)),
        "list_currencies" => json(config::list_currencies()),

        other => Err(ApiError::not_found("Command", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn request(line: &str) -> Request {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_missing_args_reads_as_empty() {
        let doc = DocumentState::default();
        let config = ConfigState::default();

        let value = dispatch(&request(r#"{"cmd":"new_document"}"#), &doc, &config).unwrap();
        assert_eq!(value["document"]["kind"], "invoice");
    }

    #[test]
    fn test_unknown_command() {
        let err = dispatch(
            &request(r#"{"cmd":"print"}"#),
            &DocumentState::default(),
            &ConfigState::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Command not found: print");
    }

    #[test]
    fn test_bad_args_are_validation_errors() {
        let err = dispatch(
            &request(r#"{"cmd":"remove_item","args":{"id":"seven"}}"#),
            &DocumentState::default(),
            &ConfigState::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_response_shape() {
        let ok = serde_json::to_value(Response::from(Ok(json!(1)))).unwrap();
        assert_eq!(ok, json!({ "ok": 1 }));

        let err = serde_json::to_value(Response::from(Err(ApiError::validation("bad")))).unwrap();
        assert_eq!(err, json!({ "error": { "code": "VALIDATION_ERROR", "message": "bad" } }));
    }

    #[test]
    fn test_list_currencies() {
        let value = dispatch(
            &request(r#"{"cmd":"list_currencies"}"#),
            &DocumentState::default(),
            &ConfigState::default(),
        )
        .unwrap();
        let list = value.as_array().unwrap();
        assert!(list.iter().any(|c| c["code"] == "INR" && c["symbol"] == "₹"));
    }
}
