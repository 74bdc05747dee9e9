//! Canonical form of policy documents.
//!
//! Documents are compared by their canonical serialization rather than raw bytes:
//! the provider returns stored documents URL-encoded and may re-marshal them, so
//! key order, whitespace and encoding must not register as a difference.

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::error::{ReconcileError, ReconcileResult};
use crate::types::PolicyDocument;

const DOCUMENT_FIELDS: [&str; 2] = ["Version", "Statement"];
const STATEMENT_FIELDS: [&str; 3] = ["Effect", "Action", "Resource"];

/// Parse raw bytes as a policy document. The top level must be a JSON object.
///
/// Field names match case-insensitively (`version`, `VERSION` and `Version` are the
/// same field); when several spellings are present the exact one wins.
pub fn parse_policy_document(bytes: &[u8]) -> ReconcileResult<PolicyDocument> {
    let mut value: Value =
        serde_json::from_slice(bytes).map_err(|e| ReconcileError::validation(e.to_string()))?;
    let Some(document) = value.as_object_mut() else {
        return Err(ReconcileError::validation("expected a JSON object"));
    };

    fold_field_names(document, &DOCUMENT_FIELDS);
    if let Some(Value::Array(statements)) = document.get_mut("Statement") {
        for statement in statements.iter_mut().filter_map(Value::as_object_mut) {
            fold_field_names(statement, &STATEMENT_FIELDS);
        }
    }

    serde_json::from_value(value).map_err(|e| ReconcileError::validation(e.to_string()))
}

fn fold_field_names(object: &mut Map<String, Value>, fields: &[&str]) {
    let keys: Vec<String> = object.keys().cloned().collect();
    for key in keys {
        let Some(field) = fields
            .iter()
            .find(|field| **field != key && field.eq_ignore_ascii_case(&key))
        else {
            continue;
        };
        if let Some(value) = object.remove(&key) {
            object.entry(*field).or_insert(value);
        }
    }
}

/// Serialize a policy document to its canonical compact JSON string.
pub fn canonicalize(document: &PolicyDocument) -> ReconcileResult<String> {
    serde_json::to_string(document).map_err(|e| ReconcileError::validation(e.to_string()))
}

/// Percent-decode a document as returned by IAM.
///
/// Decoding an unencoded JSON document is the identity unless it contains `%`.
pub fn decode_document(encoded: &str) -> Result<String, String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| format!("Failed to URL decode document: {e}"))
}
