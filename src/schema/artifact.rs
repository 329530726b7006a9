//! JSON Schema document describing fragment files for a schema.

use super::{FieldKind, Schema};
use serde_json::{Map, Value, json};

/// Build a JSON Schema object that validates fragment files.
///
/// Every field is listed, including the include reference, plus the
/// `_comment` and `$schema` keys that editors like to put in fragments.
/// Unknown keys are rejected.
pub fn json_schema(schema: &Schema) -> Value {
    let mut properties = Map::new();
    properties.insert("_comment".to_string(), json!({ "type": "string" }));
    properties.insert("$schema".to_string(), json!({ "type": "string" }));

    for field in schema.fields() {
        let property = match field.kind() {
            FieldKind::List => json!({
                "type": "array",
                "items": { "type": "string" }
            }),
            kind => json!({ "type": kind.json_type() }),
        };
        properties.insert(field.name.to_string(), property);
    }

    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
    })
}
