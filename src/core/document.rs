//! Import-side handling of pasted documents.
//!
//! Parsing is the only gate before anything reaches a store: text that is not
//! a non-empty JSON object never produces a [`PortableDocument`].

use crate::domain::model::{
    FormId, PortableDocument, FIELD_FORM_ID, FIELD_ID, FIELD_IS_ACTIVE,
};
use crate::utils::error::{MigratorError, Result};
use serde_json::Value;

pub fn parse_document(raw: &str) -> Result<PortableDocument> {
    let value: Value = serde_json::from_str(raw).map_err(|e| MigratorError::MalformedInput {
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(fields) => PortableDocument::from_fields(fields),
        Value::Array(_) => Err(MigratorError::MalformedInput {
            reason: "expected a JSON object, found an array".to_string(),
        }),
        other => Err(MigratorError::MalformedInput {
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

/// Rewrites a parsed document for creation under `target_form_id`.
///
/// The source `id` is dropped so the store assigns a fresh one, and `form_id`
/// is overwritten whatever the document claimed. With `activate` set the feed
/// is stored active; otherwise the document's own flag is left alone.
pub fn sanitize_for_import(
    mut document: PortableDocument,
    target_form_id: FormId,
    activate: bool,
) -> PortableDocument {
    if let Some(old_id) = document.remove(FIELD_ID) {
        tracing::debug!("Dropping source feed id {} from import document", old_id);
    }

    document.insert(FIELD_FORM_ID, Value::from(target_form_id));

    if activate {
        document.insert(FIELD_IS_ACTIVE, Value::Bool(true));
    }

    document
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
