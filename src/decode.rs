//! Permissive fragment decoding.
//!
//! A fragment is a JSON object keyed by lowercase field names. Decoding starts
//! from the zero-value record and overlays every present, well-typed field.
//! Malformed fields keep their default and produce a diagnostic; a fragment
//! that is not a JSON object decodes to the zero-value record. Decoding never
//! fails and never decides `found`.

use crate::error::Diagnostic;
use crate::record::{FieldValue, Record};
use crate::schema::{FieldKind, Schema};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

/// Result of decoding one fragment.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub record: Record,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode `bytes` against `schema`. `locator` only labels diagnostics.
pub fn decode(schema: &Arc<Schema>, bytes: &[u8], locator: &str) -> Decoded {
    let mut record = schema.zero_record();
    let mut diagnostics = Vec::new();

    let object = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            let d = Diagnostic::malformed_fragment(locator, json_kind(&other));
            warn!(layer = %locator, "{}", d);
            diagnostics.push(d);
            return Decoded {
                record,
                diagnostics,
            };
        }
        Err(err) => {
            let d = Diagnostic::malformed_fragment(locator, err);
            warn!(layer = %locator, "{}", d);
            diagnostics.push(d);
            return Decoded {
                record,
                diagnostics,
            };
        }
    };

    overlay(&mut record, &object, locator, &mut diagnostics);

    Decoded {
        record,
        diagnostics,
    }
}

fn overlay(record: &mut Record, object: &Map<String, Value>, locator: &str, out: &mut Vec<Diagnostic>) {
    let schema = Arc::clone(record.schema());
    for (i, spec) in schema.fields().iter().enumerate() {
        if !spec.policy.is_decodable() {
            continue;
        }
        let Some(raw) = object.get(spec.name) else {
            continue;
        };
        // null means "not specified"
        if raw.is_null() {
            continue;
        }
        match typed(spec.kind(), raw) {
            Some(value) => *record.value_mut(i) = value,
            None => {
                let d = Diagnostic::malformed_field(locator, spec.name, spec.kind());
                warn!(layer = %locator, field = spec.name, "{}", d);
                out.push(d);
            }
        }
    }
}

fn typed(kind: FieldKind, raw: &Value) -> Option<FieldValue> {
    match kind {
        FieldKind::Bool => raw.as_bool().map(FieldValue::Bool),
        FieldKind::Int => raw.as_i64().map(FieldValue::Int),
        FieldKind::Str => raw.as_str().map(|s| FieldValue::Str(s.to_string())),
        FieldKind::List => {
            let items = raw.as_array()?;
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
